//! Conversion options and configuration.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rtf::WidthMode;

/// Largest base font size in points. RTF `\fs` tops out at 32767
/// half-points.
pub const MAX_FONT_SIZE: u32 = 16383;

/// Options for rendering a document as RTF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderOptions {
    /// Mark the document as write-protected
    pub document_protected: bool,

    /// Base font size in points
    pub font_size: u32,

    /// How table column edges are derived from cell statistics
    pub width_mode: WidthMode,

    /// Absolute table width in twips (0 = size columns from content)
    pub table_width: u32,

    /// Title written to the document information group; the document's own
    /// `<title>` is used when unset
    pub title: Option<String>,

    /// Author written to the document information group
    pub author: Option<String>,

    /// Emit the `\info` group
    pub include_info: bool,

    /// Creation time written to the `\info` group (default: now)
    pub created: Option<NaiveDateTime>,

    /// Embed images; when disabled, `img` elements produce nothing
    pub embed_images: bool,

    /// Custom RTF template file
    pub template: Option<PathBuf>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable document protection.
    pub fn with_protection(mut self, protected: bool) -> Self {
        self.document_protected = protected;
        self
    }

    /// Set the base font size in points, clamped to `1..=MAX_FONT_SIZE`.
    pub fn with_font_size(mut self, points: u32) -> Self {
        self.font_size = points.clamp(1, MAX_FONT_SIZE);
        self
    }

    /// Set the table width mode.
    pub fn with_width_mode(mut self, mode: WidthMode) -> Self {
        self.width_mode = mode;
        self
    }

    /// Fit tables to an absolute width in twips.
    pub fn with_table_width(mut self, twips: u32) -> Self {
        self.table_width = twips;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Enable or disable the document information group.
    pub fn with_info(mut self, include: bool) -> Self {
        self.include_info = include;
        self
    }

    /// Set the creation time written to the information group.
    pub fn with_created(mut self, created: NaiveDateTime) -> Self {
        self.created = Some(created);
        self
    }

    /// Enable or disable image embedding.
    pub fn with_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    /// Use a custom template file.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    /// Build options from a string parameter map.
    ///
    /// Recognized keys are `document-protected`, `font-size`,
    /// `table-width-mode`, `table-width`, `title` and `author`. Missing keys
    /// keep their defaults (a document is not protected unless asked);
    /// unknown keys are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let mut options = Self::default();

        for (name, value) in params {
            let value = value.trim();
            match name.as_str() {
                "document-protected" => options.document_protected = parse_flag(name, value)?,
                "font-size" => {
                    let size: u32 = parse_number(name, value)?;
                    if size == 0 || size > MAX_FONT_SIZE {
                        return Err(invalid(name, value));
                    }
                    options.font_size = size;
                }
                "table-width-mode" => {
                    let code: u8 = parse_number(name, value)?;
                    options.width_mode =
                        WidthMode::from_code(code).ok_or_else(|| invalid(name, value))?;
                }
                "table-width" => options.table_width = parse_number(name, value)?,
                "title" => options.title = Some(value.to_string()),
                "author" => options.author = Some(value.to_string()),
                _ => log::debug!("ignoring unknown parameter '{}'", name),
            }
        }

        Ok(options)
    }

    /// Font size in half-points, as RTF measures it.
    pub fn half_points(&self) -> u32 {
        self.font_size.saturating_mul(2)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            document_protected: false,
            font_size: 12,
            width_mode: WidthMode::CumulativeMax,
            table_width: 0,
            title: None,
            author: None,
            include_info: true,
            created: None,
            embed_images: true,
            template: None,
        }
    }
}

fn invalid(name: &str, value: &str) -> Error {
    Error::InvalidOption {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| invalid(name, value))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_protection(true)
            .with_font_size(10)
            .with_width_mode(WidthMode::CumulativeTotal)
            .with_title("Report");

        assert!(options.document_protected);
        assert_eq!(options.half_points(), 20);
        assert_eq!(options.width_mode, WidthMode::CumulativeTotal);
        assert_eq!(options.title.as_deref(), Some("Report"));
    }

    #[test]
    fn test_from_params_defaults_to_unprotected() {
        let options = RenderOptions::from_params(&HashMap::new()).unwrap();
        assert!(!options.document_protected);
        assert_eq!(options, RenderOptions::default());
    }

    #[test]
    fn test_from_params() {
        let options = RenderOptions::from_params(&params(&[
            ("document-protected", "1"),
            ("font-size", "11"),
            ("table-width-mode", "3"),
            ("title", "Quiz"),
            ("unknown", "whatever"),
        ]))
        .unwrap();

        assert!(options.document_protected);
        assert_eq!(options.font_size, 11);
        assert_eq!(options.width_mode, WidthMode::CumulativeTotal);
        assert_eq!(options.title.as_deref(), Some("Quiz"));
    }

    #[test]
    fn test_from_params_rejects_bad_values() {
        let err = RenderOptions::from_params(&params(&[("font-size", "big")])).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { ref name, .. } if name == "font-size"));

        assert!(RenderOptions::from_params(&params(&[("table-width-mode", "7")])).is_err());
        assert!(RenderOptions::from_params(&params(&[("document-protected", "maybe")])).is_err());
        assert!(RenderOptions::from_params(&params(&[("font-size", "0")])).is_err());
        assert!(RenderOptions::from_params(&params(&[("font-size", "600000000")])).is_err());
    }

    #[test]
    fn test_font_size_is_capped() {
        let options = RenderOptions::new().with_font_size(u32::MAX);
        assert_eq!(options.font_size, MAX_FONT_SIZE);
        assert_eq!(options.half_points(), 32766);

        let largest = MAX_FONT_SIZE.to_string();
        let options = RenderOptions::from_params(&params(&[("font-size", &largest)])).unwrap();
        assert_eq!(options.font_size, MAX_FONT_SIZE);
    }

    #[test]
    fn test_json_round_trip_uses_kebab_case() {
        let json = r#"{"document-protected": true, "width-mode": "max-by-column"}"#;
        let options: RenderOptions = serde_json::from_str(json).unwrap();
        assert!(options.document_protected);
        assert_eq!(options.width_mode, WidthMode::MaxByColumn);
        assert_eq!(options.font_size, 12);
    }
}
