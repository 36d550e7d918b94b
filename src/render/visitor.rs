//! Visitor pattern for customizing RTF output.
//!
//! The visitor pattern allows users to customize how elements are rendered
//! without modifying the transform itself. Replacement text is inserted as
//! raw RTF.
//!
//! # Example
//!
//! ```
//! use html2rtf::model::Element;
//! use html2rtf::render::visitor::{NodeVisitor, VisitorAction};
//!
//! struct NoTables;
//!
//! impl NodeVisitor for NoTables {
//!     fn visit_table(&mut self, _table: &Element) -> VisitorAction {
//!         VisitorAction::Replace("{\\i table omitted}\\par ".to_string())
//!     }
//! }
//! ```

use crate::model::Element;

/// Action returned by visitor methods to control rendering behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VisitorAction {
    /// Continue with default rendering.
    #[default]
    Continue,

    /// Replace the node with custom RTF.
    Replace(String),

    /// Skip this node entirely (produce no output).
    Skip,
}

impl VisitorAction {
    /// Check if this action indicates the node should be skipped.
    pub fn should_skip(&self) -> bool {
        matches!(self, VisitorAction::Skip)
    }

    /// Check if this action provides replacement content.
    pub fn is_replace(&self) -> bool {
        matches!(self, VisitorAction::Replace(_))
    }

    /// Get replacement content if available.
    pub fn replacement(&self) -> Option<&str> {
        match self {
            VisitorAction::Replace(s) => Some(s),
            _ => None,
        }
    }
}

/// Trait for visiting nodes during the transform.
///
/// The specific hooks (`visit_table`, `visit_image`, `visit_link`) run first;
/// `visit_element` runs for every element they let through.
/// All methods return `VisitorAction::Continue` by default.
pub trait NodeVisitor: Send + Sync {
    /// Called before rendering any element.
    fn visit_element(&mut self, element: &Element) -> VisitorAction {
        let _ = element;
        VisitorAction::Continue
    }

    /// Called before rendering a text run.
    fn visit_text(&mut self, text: &str) -> VisitorAction {
        let _ = text;
        VisitorAction::Continue
    }

    /// Called before rendering a table.
    fn visit_table(&mut self, table: &Element) -> VisitorAction {
        let _ = table;
        VisitorAction::Continue
    }

    /// Called before embedding an image.
    ///
    /// # Arguments
    /// * `src` - The image reference
    /// * `alt` - Optional alt text for the image
    fn visit_image(&mut self, src: &str, alt: Option<&str>) -> VisitorAction {
        let _ = (src, alt);
        VisitorAction::Continue
    }

    /// Called before rendering a hyperlink.
    fn visit_link(&mut self, href: &str, element: &Element) -> VisitorAction {
        let _ = (href, element);
        VisitorAction::Continue
    }
}

/// Default visitor that performs no customization.
#[derive(Debug, Clone, Default)]
pub struct DefaultVisitor;

impl DefaultVisitor {
    /// Create a new default visitor.
    pub fn new() -> Self {
        Self
    }
}

impl NodeVisitor for DefaultVisitor {}

/// Visitor that skips all images.
#[derive(Debug, Clone, Default)]
pub struct SkipImagesVisitor;

impl NodeVisitor for SkipImagesVisitor {
    fn visit_image(&mut self, _src: &str, _alt: Option<&str>) -> VisitorAction {
        VisitorAction::Skip
    }
}

/// Visitor that drops elements by tag name, along with their content.
#[derive(Debug, Clone, Default)]
pub struct SkipTagsVisitor {
    tags: Vec<String>,
}

impl SkipTagsVisitor {
    /// Create a visitor skipping the given tags (case-insensitive).
    pub fn new<S: Into<String>>(tags: impl IntoIterator<Item = S>) -> Self {
        Self {
            tags: tags.into_iter().map(|t| t.into().to_ascii_lowercase()).collect(),
        }
    }
}

impl NodeVisitor for SkipTagsVisitor {
    fn visit_element(&mut self, element: &Element) -> VisitorAction {
        if self.tags.iter().any(|t| element.is(t)) {
            VisitorAction::Skip
        } else {
            VisitorAction::Continue
        }
    }
}

/// Composite visitor that chains multiple visitors.
///
/// Visitors are called in order. The first visitor that returns
/// a non-Continue action determines the result.
#[derive(Default)]
pub struct CompositeVisitor {
    visitors: Vec<Box<dyn NodeVisitor>>,
}

impl CompositeVisitor {
    /// Create a new composite visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visitor to the chain.
    pub fn with_visitor<V: NodeVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitors.push(Box::new(visitor));
        self
    }

    fn first_action(
        &mut self,
        mut visit: impl FnMut(&mut dyn NodeVisitor) -> VisitorAction,
    ) -> VisitorAction {
        for visitor in &mut self.visitors {
            let action = visit(visitor.as_mut());
            if action != VisitorAction::Continue {
                return action;
            }
        }
        VisitorAction::Continue
    }
}

impl NodeVisitor for CompositeVisitor {
    fn visit_element(&mut self, element: &Element) -> VisitorAction {
        self.first_action(|v| v.visit_element(element))
    }

    fn visit_text(&mut self, text: &str) -> VisitorAction {
        self.first_action(|v| v.visit_text(text))
    }

    fn visit_table(&mut self, table: &Element) -> VisitorAction {
        self.first_action(|v| v.visit_table(table))
    }

    fn visit_image(&mut self, src: &str, alt: Option<&str>) -> VisitorAction {
        self.first_action(|v| v.visit_image(src, alt))
    }

    fn visit_link(&mut self, href: &str, element: &Element) -> VisitorAction {
        self.first_action(|v| v.visit_link(href, element))
    }
}
