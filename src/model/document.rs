//! Document-level types.

use super::Element;
use serde::{Deserialize, Serialize};

/// A parsed markup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Root element (normally `html`)
    pub root: Element,

    /// Number of recoverable errors reported by the markup parser
    pub parse_errors: usize,
}

impl Document {
    /// Create a document from its root element.
    pub fn new(root: Element) -> Self {
        Self {
            root,
            parse_errors: 0,
        }
    }

    /// The `head` element, if any.
    pub fn head(&self) -> Option<&Element> {
        if self.root.is("head") {
            return Some(&self.root);
        }
        self.root.find("head")
    }

    /// The `body` element, falling back to the root.
    pub fn body(&self) -> &Element {
        if self.root.is("body") {
            return &self.root;
        }
        self.root.find("body").unwrap_or(&self.root)
    }

    /// Document title from the `title` element.
    pub fn title(&self) -> Option<String> {
        self.root
            .find("title")
            .map(|t| t.text_content().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Text contents of every `style` element, in document order.
    pub fn style_blocks(&self) -> Vec<String> {
        self.root
            .elements_by_tag("style")
            .map(Element::text_content)
            .collect()
    }

    /// Count descendant elements with the given tag name.
    pub fn count_elements(&self, name: &str) -> usize {
        usize::from(self.root.is(name)) + self.root.elements_by_tag(name).count()
    }

    /// Plain text of the body.
    pub fn plain_text(&self) -> String {
        self.body().text_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(
            Element::new("html")
                .with_child(
                    Element::new("head")
                        .with_child(Element::new("title").with_text(" Report "))
                        .with_child(Element::new("style").with_text(".a{color:red}")),
                )
                .with_child(
                    Element::new("body")
                        .with_child(Element::new("p").with_text("Hello"))
                        .with_child(Element::new("style").with_text(".b{font-weight:bold}")),
                ),
        )
    }

    #[test]
    fn test_head_and_body() {
        let d = doc();
        assert!(d.head().is_some());
        assert_eq!(d.body().name, "body");
        assert_eq!(d.plain_text(), "Hello.b{font-weight:bold}");
    }

    #[test]
    fn test_title_trimmed() {
        assert_eq!(doc().title(), Some("Report".to_string()));
    }

    #[test]
    fn test_style_blocks_in_order() {
        assert_eq!(
            doc().style_blocks(),
            vec![".a{color:red}".to_string(), ".b{font-weight:bold}".to_string()]
        );
    }

    #[test]
    fn test_body_falls_back_to_root() {
        let d = Document::new(Element::new("div").with_text("x"));
        assert_eq!(d.body().name, "div");
        assert!(d.head().is_none());
    }
}
