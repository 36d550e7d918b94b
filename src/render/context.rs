//! Per-conversion mutable state.

use std::collections::HashMap;

use crate::fetch::Fetcher;
use crate::render::ConversionStats;
use crate::rtf::{ColorTable, ColumnStats, ImageEmbedder};

/// State shared by every step of one conversion.
///
/// A fresh context is created for each document, so color numbering and
/// table statistics never leak between conversions.
pub struct ConversionContext<'a> {
    /// Colors registered so far
    pub colors: ColorTable,
    /// Statistics of the most recently measured table
    pub columns: ColumnStats,
    /// Counters
    pub stats: ConversionStats,
    style_blocks: Vec<String>,
    images: ImageEmbedder<'a>,
}

impl<'a> ConversionContext<'a> {
    /// Create a context for a document with the given `<style>` contents.
    pub fn new(
        style_blocks: Vec<String>,
        images: &'a HashMap<String, Vec<u8>>,
        fetcher: &'a dyn Fetcher,
    ) -> Self {
        Self {
            colors: ColorTable::new(),
            columns: ColumnStats::new(),
            stats: ConversionStats::new(),
            style_blocks,
            images: ImageEmbedder::new(images, fetcher),
        }
    }

    /// Contents of the document's `<style>` elements.
    pub fn style_blocks(&self) -> &[String] {
        &self.style_blocks
    }

    /// Color table index for a CSS color value, counting new colors.
    pub fn color_index(&mut self, value: &str) -> u32 {
        let before = self.colors.len();
        let index = self.colors.color_index(value);
        if self.colors.len() > before {
            self.stats.color_count += 1;
        }
        index
    }

    /// Picture body for an image, counting hits and misses.
    pub fn embed_image(&mut self, src: &str, width: Option<u32>, height: Option<u32>) -> String {
        let picture = self.images.embed(src, width, height);
        if picture.is_empty() {
            self.stats.missing_image_count += 1;
        } else {
            self.stats.image_count += 1;
        }
        picture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::NoFetch;

    #[test]
    fn test_contexts_are_independent() {
        let images = HashMap::new();
        let mut first = ConversionContext::new(Vec::new(), &images, &NoFetch);
        let mut second = ConversionContext::new(Vec::new(), &images, &NoFetch);

        assert_eq!(first.color_index("#ff0000"), 6);
        assert_eq!(first.color_index("#00ff00"), 7);
        assert_eq!(second.color_index("#00ff00"), 6);
        assert_eq!(first.stats.color_count, 2);
        assert_eq!(second.stats.color_count, 1);
    }

    #[test]
    fn test_missing_image_is_counted() {
        let images = HashMap::new();
        let mut ctx = ConversionContext::new(Vec::new(), &images, &NoFetch);
        assert_eq!(ctx.embed_image("nowhere.png", None, None), "");
        assert_eq!(ctx.stats.missing_image_count, 1);
        assert_eq!(ctx.stats.image_count, 0);
    }
}
