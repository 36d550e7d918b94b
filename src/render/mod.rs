//! Rendering module for converting document trees to RTF.

mod context;
mod options;
mod result;
pub mod template;
mod transform;
pub mod visitor;

pub use context::ConversionContext;
pub use options::RenderOptions;
pub use result::{ConversionStats, RenderResult};
pub use template::{Template, TemplateFields, DEFAULT_TEMPLATE};
pub use transform::{to_rtf, RtfTransform};
pub use visitor::{
    CompositeVisitor, DefaultVisitor, NodeVisitor, SkipImagesVisitor, SkipTagsVisitor,
    VisitorAction,
};
