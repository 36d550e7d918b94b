//! Parsing options and configuration.

use serde::{Deserialize, Serialize};

/// Options for parsing HTML documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Rewrite non-ASCII characters into marker nodes after parsing
    pub split_non_ascii: bool,

    /// Ask the HTML parser for detailed (slower) error messages
    pub exact_errors: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable strict mode (reject documents the parser had to repair).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable lenient mode (accept anything the parser can repair).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable the non-ASCII splitting pass.
    pub fn with_split_non_ascii(mut self, split: bool) -> Self {
        self.split_non_ascii = split;
        self
    }

    /// Enable detailed parser error messages.
    pub fn with_exact_errors(mut self, exact: bool) -> Self {
        self.exact_errors = exact;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            split_non_ascii: true,
            exact_errors: false,
        }
    }
}

/// Error handling mode for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Fail if the parser reported any error
    Strict,
    /// Accept repaired markup, only failing on unusable input
    #[default]
    Lenient,
}
