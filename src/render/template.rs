//! RTF document template.
//!
//! A template is an RTF document with placeholders of the form `%%NAME%%`.
//! Substitution is a single pass over the template, so placeholder-like text
//! inside substituted values is left alone.

use std::borrow::Cow;
use std::path::Path;

use crate::error::{Error, Result};

/// Placeholder replaced by the converted body.
pub const BODY: &str = "BODY";
/// Placeholder replaced by colors registered during conversion.
pub const COLOUR_TABLE: &str = "COLOURTABLE";
/// Placeholder replaced by the protection control words.
pub const PROTECTION: &str = "PROTECTION";
/// Placeholder replaced by the base font size in half-points.
pub const FONT_SIZE: &str = "FONTSIZE";
/// Placeholder replaced by the `\info` group.
pub const INFO: &str = "INFO";

/// Control words marking a document as protected.
pub const PROTECTION_WORDS: &str = "\\formprot\\allprot";

/// The built-in template.
///
/// The color table predefines black, blue, gray, red and green as indices
/// 1 to 5; registered colors follow.
pub const DEFAULT_TEMPLATE: &str = concat!(
    "{\\rtf1\\ansi\\ansicpg1252\\deff0\\deflang1033\n",
    "{\\fonttbl{\\f0\\froman\\fcharset0 Times New Roman;}{\\f1\\fswiss\\fcharset0 Arial;}",
    "{\\f2\\fmodern\\fcharset0 Courier New;}{\\f3\\fnil\\fcharset2 Symbol;}}\n",
    "{\\colortbl;\\red0\\green0\\blue0;\\red0\\green0\\blue255;\\red128\\green128\\blue128;",
    "\\red255\\green0\\blue0;\\red0\\green128\\blue0%%COLOURTABLE%%;}\n",
    "%%INFO%%",
    "\\paperw11906\\paperh16838\\margl1440\\margr1440\\margt1440\\margb1440%%PROTECTION%%\n",
    "\\viewkind4\\uc1\\pard\\plain\\f1\\fs%%FONTSIZE%%\n",
    "%%BODY%%\n",
    "}\n",
);

/// Values substituted into a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateFields<'a> {
    /// Converted body
    pub body: &'a str,
    /// Color table fragment
    pub colour_table: &'a str,
    /// Protection control words, or empty
    pub protection: &'a str,
    /// Base font size in half-points
    pub font_size: u32,
    /// Information group, or empty
    pub info: &'a str,
}

impl<'a> TemplateFields<'a> {
    fn lookup(&self, name: &str) -> Option<Cow<'a, str>> {
        match name {
            BODY => Some(Cow::Borrowed(self.body)),
            COLOUR_TABLE => Some(Cow::Borrowed(self.colour_table)),
            PROTECTION => Some(Cow::Borrowed(self.protection)),
            FONT_SIZE => Some(Cow::Owned(self.font_size.to_string())),
            INFO => Some(Cow::Borrowed(self.info)),
            _ => None,
        }
    }
}

/// A loaded RTF template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
}

impl Template {
    /// Use `source` as a template. It must contain a `%%BODY%%` placeholder.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        if !source.contains("%%BODY%%") {
            return Err(Error::Template("template has no %%BODY%% placeholder".into()));
        }
        if !source.trim_start().starts_with("{\\rtf") {
            log::warn!("template does not start with an RTF header");
        }
        Ok(Self { source })
    }

    /// Load a template from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::Template(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(source)
    }

    /// The template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute every known placeholder. Unknown placeholders are kept.
    pub fn render(&self, fields: &TemplateFields<'_>) -> String {
        let mut out = String::with_capacity(self.source.len() + fields.body.len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find("%%") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("%%") else {
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };
            match fields.lookup(&after[..end]) {
                Some(value) => {
                    out.push_str(&value);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("%%");
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }
}

impl Default for Template {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
