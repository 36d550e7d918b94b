//! # html2rtf
//!
//! HTML to RTF conversion library for Rust.
//!
//! This library converts HTML documents and fragments into complete RTF
//! documents, keeping bold, italic, underline, colors, tables, images and
//! non-ASCII characters.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> html2rtf::Result<()> {
//!     let rtf = html2rtf::convert("<p>Hello, <b>world</b></p>")?;
//!     std::fs::write("hello.rtf", rtf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Parse**: markup is parsed with html5ever into an owned tree
//! - **Normalize**: every non-ASCII character becomes a marker element
//! - **Transform**: the tree is walked and written as RTF, building a color
//!   table, measuring tables and embedding images on the way
//! - **Template**: the body is placed into an RTF template
//!
//! Every conversion has its own state, so documents can be converted in
//! parallel (see [`convert_batch`]).

pub mod error;
pub mod fetch;
pub mod model;
pub mod parser;
pub mod render;
pub mod rtf;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use error::{Error, Result};
pub use fetch::{DefaultFetcher, Fetcher, FileFetcher, NoFetch};
pub use model::{Document, Element, Node};
pub use parser::{parse_html, ErrorMode, HtmlParser, ParseOptions};
pub use render::{ConversionStats, NodeVisitor, RenderOptions, RenderResult, Template};
pub use rtf::WidthMode;

#[cfg(feature = "http")]
pub use fetch::HttpFetcher;

use std::collections::HashMap;
use std::path::Path;

use rayon::prelude::*;

use render::RtfTransform;

/// Convert an HTML document or fragment to RTF with default options.
///
/// Images are fetched over HTTP when the `http` feature is enabled.
///
/// # Example
///
/// ```no_run
/// let rtf = html2rtf::convert("<h1>Title</h1><p>Body</p>").unwrap();
/// assert!(rtf.starts_with("{\\rtf1"));
/// ```
pub fn convert(html: &str) -> Result<String> {
    convert_with_options(html, &RenderOptions::default(), None)
}

/// Convert HTML to RTF with custom options and supplied images.
///
/// `images` maps image references (as they appear URL-decoded in `src`) to
/// their bytes. References missing from the map are fetched.
///
/// # Example
///
/// ```no_run
/// use std::collections::HashMap;
/// use html2rtf::{convert_with_options, RenderOptions};
///
/// let mut images = HashMap::new();
/// images.insert("logo.png".to_string(), std::fs::read("logo.png").unwrap());
///
/// let options = RenderOptions::new().with_protection(true);
/// let rtf = convert_with_options("<img src=\"logo.png\">", &options, Some(&images)).unwrap();
/// ```
pub fn convert_with_options(
    html: &str,
    options: &RenderOptions,
    images: Option<&HashMap<String, Vec<u8>>>,
) -> Result<String> {
    let mut converter = Html2Rtf::new().with_options(options.clone());
    if let Some(images) = images {
        converter.images = images.clone();
    }
    Ok(converter.convert(html)?.content)
}

/// Convert raw HTML bytes. Invalid UTF-8 sequences become U+FFFD.
pub fn convert_bytes(data: &[u8], options: &RenderOptions) -> Result<String> {
    Ok(Html2Rtf::new()
        .with_options(options.clone())
        .convert_bytes(data)?
        .content)
}

/// Convert an HTML file. Relative image references resolve against the
/// file's directory.
///
/// # Example
///
/// ```no_run
/// use html2rtf::{convert_file, RenderOptions};
///
/// let rtf = convert_file("page.html", &RenderOptions::default()).unwrap();
/// std::fs::write("page.rtf", rtf).unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    Ok(Html2Rtf::new()
        .with_options(options.clone())
        .convert_file(path)?
        .content)
}

/// Convert several documents in parallel. Results keep the input order.
pub fn convert_batch<S: AsRef<str> + Sync>(
    inputs: &[S],
    options: &RenderOptions,
) -> Vec<Result<String>> {
    let converter = Html2Rtf::new().with_options(options.clone());
    inputs
        .par_iter()
        .map(|html| converter.convert(html.as_ref()).map(|r| r.content))
        .collect()
}

/// Builder for configuring and running conversions.
///
/// # Example
///
/// ```no_run
/// use html2rtf::Html2Rtf;
///
/// let result = Html2Rtf::new()
///     .protected()
///     .with_font_size(11)
///     .with_title("Quiz")
///     .with_image("chart.png", std::fs::read("chart.png")?)
///     .convert("<p>See <img src=\"chart.png\"></p>")?;
/// println!("{} images", result.stats.image_count);
/// # Ok::<(), html2rtf::Error>(())
/// ```
pub struct Html2Rtf {
    parse_options: ParseOptions,
    render_options: RenderOptions,
    images: HashMap<String, Vec<u8>>,
    fetcher: Box<dyn Fetcher>,
}

impl Html2Rtf {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
            images: HashMap::new(),
            fetcher: Box::new(DefaultFetcher::new()),
        }
    }

    /// Replace all render options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Replace all parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Reject markup the parser reports errors for.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Mark the output document as protected.
    pub fn protected(mut self) -> Self {
        self.render_options = self.render_options.with_protection(true);
        self
    }

    /// Set the base font size in points.
    pub fn with_font_size(mut self, points: u32) -> Self {
        self.render_options = self.render_options.with_font_size(points);
        self
    }

    /// Set the table width mode.
    pub fn with_width_mode(mut self, mode: WidthMode) -> Self {
        self.render_options = self.render_options.with_width_mode(mode);
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_title(title);
        self
    }

    /// Supply image bytes for a reference.
    pub fn with_image(mut self, name: impl Into<String>, data: Vec<u8>) -> Self {
        self.images.insert(name.into(), data);
        self
    }

    /// Use a custom fetcher for images not supplied directly.
    pub fn with_fetcher<F: Fetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Never fetch images; only supplied images are embedded.
    pub fn offline(self) -> Self {
        self.with_fetcher(NoFetch)
    }

    /// Render options in use.
    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Parse markup into a normalized document.
    pub fn parse(&self, html: &str) -> Result<Document> {
        HtmlParser::with_options(self.parse_options.clone()).parse(html)
    }

    /// Convert an HTML string.
    pub fn convert(&self, html: &str) -> Result<RenderResult> {
        let doc = self.parse(html)?;
        self.render(&doc, None)
    }

    /// Convert an HTML string, customizing output with a visitor.
    pub fn convert_with_visitor(
        &self,
        html: &str,
        visitor: &mut dyn NodeVisitor,
    ) -> Result<RenderResult> {
        let doc = self.parse(html)?;
        self.render(&doc, Some(visitor))
    }

    /// Convert raw HTML bytes.
    pub fn convert_bytes(&self, data: &[u8]) -> Result<RenderResult> {
        let doc = HtmlParser::with_options(self.parse_options.clone()).parse_bytes(data)?;
        self.render(&doc, None)
    }

    /// Convert an HTML file, resolving relative images against its directory
    /// unless a custom fetcher was set.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<RenderResult> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let doc = HtmlParser::with_options(self.parse_options.clone()).parse_bytes(&data)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let files = FileFetcher::new(base_dir);
        let fetcher = FallbackFetcher {
            primary: self.fetcher.as_ref(),
            fallback: &files,
        };
        let mut transform = RtfTransform::new(&self.render_options, &self.images, &fetcher);
        transform.render(&doc)
    }

    /// Render an already parsed document.
    pub fn render(
        &self,
        doc: &Document,
        visitor: Option<&mut dyn NodeVisitor>,
    ) -> Result<RenderResult> {
        let mut transform =
            RtfTransform::new(&self.render_options, &self.images, self.fetcher.as_ref());
        if let Some(visitor) = visitor {
            transform = transform.with_visitor(visitor);
        }
        transform.render(doc)
    }
}

impl Default for Html2Rtf {
    fn default() -> Self {
        Self::new()
    }
}

/// Tries one fetcher, then another.
struct FallbackFetcher<'a> {
    primary: &'a dyn Fetcher,
    fallback: &'a dyn Fetcher,
}

impl Fetcher for FallbackFetcher<'_> {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        self.primary
            .fetch(reference)
            .or_else(|_| self.fallback.fetch(reference))
    }
}
