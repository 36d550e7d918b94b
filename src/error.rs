//! Error types for html2rtf library.

use std::io;
use thiserror::Error;

/// Result type alias for html2rtf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during conversion.
///
/// Only parsing and transform/template failures abort a conversion. Missing
/// images, unknown colors and unmatched classes degrade silently.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input markup could not be parsed into a document tree.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The RTF template could not be loaded or is not usable.
    #[error("Template error: {0}")]
    Template(String),

    /// The tree-to-RTF transform failed to apply.
    #[error("Transform error: {0}")]
    Transform(String),

    /// A conversion option had an unusable value.
    #[error("Invalid option '{name}': {value}")]
    InvalidOption {
        /// Option name
        name: String,
        /// Offending value
        value: String,
    },

    /// Fetching an external resource failed.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Decoding or encoding an image failed.
    #[error("Image error: {0}")]
    Image(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error aborted the conversion at the parse stage.
    pub fn is_parse_stage(&self) -> bool {
        matches!(self, Error::MalformedInput(_))
    }

    /// Whether this error aborted the conversion at the transform stage.
    pub fn is_transform_stage(&self) -> bool {
        matches!(self, Error::Template(_) | Error::Transform(_))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}
