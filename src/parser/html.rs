//! HTML parsing into the owned document model.
//!
//! Parsing is delegated to `html5ever` with an `RcDom` sink; the resulting
//! reference-counted tree is then copied into [`Document`] so the rest of the
//! crate works on plain owned data.

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::options::{ErrorMode, ParseOptions};
use crate::error::{Error, Result};
use crate::model::{Attribute, Document, Element, Node};

/// HTML parser producing [`Document`] trees.
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    /// Create a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parser options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse an HTML document or fragment from a string.
    pub fn parse(&self, input: &str) -> Result<Document> {
        if input.trim().is_empty() {
            return Err(Error::MalformedInput("empty document".into()));
        }
        let dom = parse_document(RcDom::default(), self.parse_opts()).one(input);
        self.finish(dom)
    }

    /// Parse an HTML document from UTF-8 bytes.
    ///
    /// Invalid UTF-8 sequences are decoded as U+FFFD.
    pub fn parse_bytes(&self, data: &[u8]) -> Result<Document> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::MalformedInput("empty document".into()));
        }
        let mut reader = data;
        let dom = parse_document(RcDom::default(), self.parse_opts())
            .from_utf8()
            .read_from(&mut reader)
            .map_err(|e| Error::MalformedInput(e.to_string()))?;
        self.finish(dom)
    }

    fn parse_opts(&self) -> ParseOpts {
        ParseOpts {
            tree_builder: TreeBuilderOpts {
                drop_doctype: true,
                exact_errors: self.options.exact_errors,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn finish(&self, dom: RcDom) -> Result<Document> {
        let errors = dom.errors.borrow();
        for message in errors.iter() {
            log::debug!("html parse error: {}", message);
        }
        if self.options.error_mode == ErrorMode::Strict && !errors.is_empty() {
            return Err(Error::MalformedInput(format!(
                "{} parse error(s), first: {}",
                errors.len(),
                errors[0]
            )));
        }

        let root = dom
            .document
            .children
            .borrow()
            .iter()
            .find_map(convert_element)
            .ok_or_else(|| Error::MalformedInput("document has no root element".into()))?;

        let mut document = Document::new(root);
        document.parse_errors = errors.len();
        drop(errors);

        if self.options.split_non_ascii {
            document = document.split_non_ascii();
        }
        Ok(document)
    }
}

/// Parse an HTML string with default options.
pub fn parse_html(input: &str) -> Result<Document> {
    HtmlParser::new().parse(input)
}

fn convert_element(handle: &Handle) -> Option<Element> {
    let NodeData::Element {
        ref name,
        ref attrs,
        ..
    } = handle.data
    else {
        return None;
    };

    let attrs = attrs
        .borrow()
        .iter()
        .map(|attr| Attribute {
            name: match &attr.name.prefix {
                Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                None => attr.name.local.to_string(),
            },
            value: attr.value.to_string(),
        })
        .collect();

    let children = handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_node)
        .collect();

    Some(Element {
        name: name.local.to_string(),
        attrs,
        children,
    })
}

fn convert_node(handle: &Handle) -> Option<Node> {
    match handle.data {
        NodeData::Text { ref contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Element { .. } => convert_element(handle).map(Node::Element),
        NodeData::Document
        | NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> HtmlParser {
        HtmlParser::with_options(ParseOptions::new().with_split_non_ascii(false))
    }

    #[test]
    fn test_parse_builds_html_root() {
        let doc = raw().parse("<p class=\"x\">Hello <b>world</b></p>").unwrap();
        assert_eq!(doc.root.name, "html");
        let p = doc.body().find("p").unwrap();
        assert_eq!(p.attr("class"), Some("x"));
        assert_eq!(p.text_content(), "Hello world");
    }

    #[test]
    fn test_comments_are_dropped() {
        let doc = raw().parse("<div>a<!-- hidden -->b</div>").unwrap();
        assert_eq!(doc.body().find("div").unwrap().text_content(), "ab");
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(matches!(
            parse_html("   \n"),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            HtmlParser::new().parse_bytes(b""),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_becomes_replacement_marker() {
        let doc = HtmlParser::new().parse_bytes(b"<p>a\xffb</p>").unwrap();
        let p = doc.body().find("p").unwrap();
        assert_eq!(p.children.len(), 3);
        assert_eq!(
            p.children[1].as_element().and_then(Element::marker_code_point),
            Some(0xFFFD)
        );
    }

    #[test]
    fn test_strict_mode_rejects_repaired_markup() {
        let strict = HtmlParser::with_options(ParseOptions::new().strict());
        assert!(strict.parse("<p>unclosed <b>bold</p>").is_err());
    }

    #[test]
    fn test_entities_are_decoded() {
        let doc = raw().parse("<p>&amp; &lt;x&gt;</p>").unwrap();
        assert_eq!(doc.body().find("p").unwrap().text_content(), "& <x>");
    }
}
