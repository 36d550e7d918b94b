//! Tree node types.

use serde::{Deserialize, Serialize};

/// Tag name of the synthetic element that stands in for one non-ASCII character.
pub const MARKER_TAG: &str = "specialcharacter";

/// Attribute of [`MARKER_TAG`] carrying the decimal code point.
pub const MARKER_ATTR: &str = "dec";

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// An element with a tag name, attributes and children
    Element(Element),
    /// A run of character data
    Text(String),
}

impl Node {
    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    /// Create a marker node for a single character.
    pub fn marker(ch: char) -> Self {
        Node::Element(Element::new(MARKER_TAG).with_attr(MARKER_ATTR, (ch as u32).to_string()))
    }

    /// Get the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// Get the text payload if this node is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// Check whether this node is an element with the given tag name.
    pub fn is_element(&self, name: &str) -> bool {
        self.as_element().is_some_and(|e| e.is(name))
    }

    /// Check whether this node is a marker node.
    pub fn is_marker(&self) -> bool {
        self.as_element().is_some_and(Element::is_marker)
    }

    /// Concatenated text of this node and its descendants.
    ///
    /// Marker nodes contribute the character they stand for.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => e.collect_text(out),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// A single attribute. Names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub value: String,
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name (lowercase for parsed HTML)
    pub name: String,

    /// Attributes in source order
    pub attrs: Vec<Attribute>,

    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create a new element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute, replacing an existing one with the same name.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a child node.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a text child.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    /// Set an attribute value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute { name, value }),
        }
    }

    /// Get an attribute value by exact name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Check whether an attribute is present.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Check the tag name (ASCII case-insensitive).
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Check whether this element is a marker node.
    pub fn is_marker(&self) -> bool {
        self.is(MARKER_TAG)
    }

    /// Character represented by a marker node.
    pub fn marker_char(&self) -> Option<char> {
        if !self.is_marker() {
            return None;
        }
        self.marker_code_point().and_then(char::from_u32)
    }

    /// Decimal code point carried by a marker node.
    pub fn marker_code_point(&self) -> Option<u32> {
        self.attr(MARKER_ATTR).and_then(|v| v.trim().parse().ok())
    }

    /// Iterate over child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Iterate over all descendant elements in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Descendant elements with the given tag name, in document order.
    pub fn elements_by_tag<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.descendants().filter(move |e| e.is(name))
    }

    /// First descendant element with the given tag name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.is(name))
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(ch) = self.marker_char() {
            out.push(ch);
            return;
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// Depth-first iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let Node::Element(element) = node {
                self.stack.extend(element.children.iter().rev());
                return Some(element);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("tr")
            .with_child(Element::new("td").with_text("a"))
            .with_child(
                Element::new("td")
                    .with_child(Element::new("b").with_text("b"))
                    .with_text("c"),
            )
    }

    #[test]
    fn test_attr_lookup_is_case_sensitive() {
        let el = Element::new("img").with_attr("src", "x.png");
        assert_eq!(el.attr("src"), Some("x.png"));
        assert_eq!(el.attr("SRC"), None);
    }

    #[test]
    fn test_set_attr_replaces() {
        let el = Element::new("p").with_attr("class", "a").with_attr("class", "b");
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.attr("class"), Some("b"));
    }

    #[test]
    fn test_descendants_document_order() {
        let row = sample();
        let names: Vec<&str> = row.descendants().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["td", "td", "b"]);
    }

    #[test]
    fn test_text_content() {
        assert_eq!(sample().text_content(), "abc");
    }

    #[test]
    fn test_marker_roundtrip() {
        let node = Node::marker('é');
        assert!(node.is_marker());
        let el = node.as_element().unwrap();
        assert_eq!(el.attr(MARKER_ATTR), Some("233"));
        assert_eq!(el.marker_char(), Some('é'));
        assert_eq!(node.text_content(), "é");
    }
}
