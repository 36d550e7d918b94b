//! HTML parsing module.

mod html;
mod options;
pub mod splitter;

pub use html::{parse_html, HtmlParser};
pub use options::{ErrorMode, ParseOptions};
pub use splitter::{reassemble, split_element, split_non_ascii, split_text};
