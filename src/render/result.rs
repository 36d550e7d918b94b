//! Conversion result with metadata and statistics.

use serde::{Deserialize, Serialize};

/// Result of converting a document, including the RTF and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The complete RTF document
    pub content: String,

    /// Title written to the document information group
    pub title: Option<String>,

    /// Conversion statistics
    pub stats: ConversionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, title: Option<String>, stats: ConversionStats) -> Self {
        Self {
            content,
            title,
            stats,
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics collected during a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of block paragraphs written
    pub paragraph_count: u32,

    /// Number of headings written
    pub heading_count: u32,

    /// Number of tables written
    pub table_count: u32,

    /// Number of images embedded
    pub image_count: u32,

    /// Number of images that could not be resolved
    pub missing_image_count: u32,

    /// Number of hyperlinks written
    pub link_count: u32,

    /// Number of list items written
    pub list_item_count: u32,

    /// Number of non-ASCII characters written
    pub special_char_count: u32,

    /// Number of colors added to the color table
    pub color_count: u32,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.paragraph_count += other.paragraph_count;
        self.heading_count += other.heading_count;
        self.table_count += other.table_count;
        self.image_count += other.image_count;
        self.missing_image_count += other.missing_image_count;
        self.link_count += other.link_count;
        self.list_item_count += other.list_item_count;
        self.special_char_count += other.special_char_count;
        self.color_count += other.color_count;
    }
}
