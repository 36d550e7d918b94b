//! Non-ASCII isolation pass.
//!
//! Every character outside 7-bit ASCII is lifted out of its text node into a
//! `specialcharacter` marker element carrying the decimal code point, so the
//! RTF encoder only ever sees ASCII text runs. The pass builds a new tree from
//! the input instead of editing it in place.

use crate::model::{Document, Element, Node};

/// Normalize a node, returning the nodes that replace it.
///
/// Elements and ASCII-only text map to a single node. Text containing
/// non-ASCII characters maps to alternating ASCII runs and marker nodes, in
/// original order.
pub fn split_non_ascii(node: &Node) -> Vec<Node> {
    match node {
        Node::Text(text) => split_text(text),
        Node::Element(element) => vec![Node::Element(split_element(element))],
    }
}

/// Rebuild an element with all descendant text normalized.
pub fn split_element(element: &Element) -> Element {
    Element {
        name: element.name.clone(),
        attrs: element.attrs.clone(),
        children: element.children.iter().flat_map(split_non_ascii).collect(),
    }
}

/// Split a text run into ASCII text nodes and marker nodes.
pub fn split_text(text: &str) -> Vec<Node> {
    if text.is_ascii() {
        return vec![Node::Text(text.to_string())];
    }

    let mut nodes = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_ascii() {
            current.push(ch);
        } else {
            if !current.is_empty() {
                nodes.push(Node::Text(std::mem::take(&mut current)));
            }
            nodes.push(Node::marker(ch));
        }
    }
    if !current.is_empty() {
        nodes.push(Node::Text(current));
    }
    nodes
}

/// Concatenate a sequence of split nodes back into the original text.
pub fn reassemble(nodes: &[Node]) -> String {
    nodes.iter().map(Node::text_content).collect()
}

impl Document {
    /// Return a copy of this document with every non-ASCII character isolated
    /// into a marker node.
    pub fn split_non_ascii(&self) -> Document {
        let root = split_element(&self.root);
        log::debug!(
            "split non-ASCII text: {} marker(s)",
            root.elements_by_tag(crate::model::MARKER_TAG).count()
        );
        Document {
            root,
            parse_errors: self.parse_errors,
        }
    }
}
