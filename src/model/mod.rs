//! Document model types.
//!
//! This module defines the owned element/text tree that bridges HTML parsing
//! and RTF rendering. Trees are built once by the parser, rebuilt by the
//! Unicode splitter, and only read afterwards.

mod document;
mod node;

pub use document::Document;
pub use node::{Attribute, Descendants, Element, Node, MARKER_ATTR, MARKER_TAG};
