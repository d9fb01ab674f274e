//! Minimal markup tree with a deterministic XML serializer.
//!
//! The exporter assembles the whole document as an [`Element`] tree first and
//! serializes it once at the end, so a serialization failure never leaves a
//! half-written document behind.
//!
//! - [`Node::Text`] holds raw text; the serializer escapes it.
//! - [`Node::Raw`] holds text that is already escaped (for example
//!   [`DisplayText`](crate::core::codec::DisplayText)); it is written as is.
//!
//! # Example
//!
//! ```
//! use chatexport::markup::{Element, Serializer};
//!
//! let root = Element::new("turn")
//!     .with_attr("author", "Alice")
//!     .with_child(Element::new("body").with_text("a < b"));
//!
//! let xml = Serializer::new().with_declaration(false).serialize(&root).unwrap();
//! assert_eq!(xml, "<turn author=\"Alice\">\n    <body>a &lt; b</body>\n</turn>\n");
//! ```

use std::fmt::Write as _;

use crate::core::codec::escape;
use crate::error::{ExportError, Result};

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Unescaped text.
    Text(String),
    /// Pre-escaped text, written verbatim.
    Raw(String),
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Convenience for `Element::new(name).with_text(text)`.
    pub fn text_element(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Sets an attribute, replacing an existing one of the same name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    #[must_use]
    pub fn with_raw(mut self, escaped: impl Into<String>) -> Self {
        self.children.push(Node::Raw(escaped.into()));
        self
    }

    /// Value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text content of direct text children, unescaped form for
    /// [`Node::Text`] and stored form for [`Node::Raw`].
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) | Node::Raw(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Writes an [`Element`] tree as indented XML.
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    indent: usize,
    declaration: bool,
}

impl Default for Serializer {
    fn default() -> Self {
        Self {
            indent: 4,
            declaration: true,
        }
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spaces per nesting level.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first.
    #[must_use]
    pub fn with_declaration(mut self, enabled: bool) -> Self {
        self.declaration = enabled;
        self
    }

    /// Serializes the tree.
    ///
    /// Fails with [`ExportError::Transform`] on an invalid element or
    /// attribute name.
    pub fn serialize(&self, root: &Element) -> Result<String> {
        let mut out = String::new();
        if self.declaration {
            out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }
        self.write_element(&mut out, root, 0)?;
        Ok(out)
    }

    fn write_element(&self, out: &mut String, element: &Element, depth: usize) -> Result<()> {
        check_name(&element.name)?;
        let pad = " ".repeat(self.indent * depth);

        write!(out, "{pad}<{}", element.name)?;
        for (name, value) in &element.attributes {
            check_name(name)?;
            write!(out, " {name}=\"{}\"", escape(&strip_illegal(value)))?;
        }

        if element.children.is_empty() {
            out.push_str("/>\n");
            return Ok(());
        }
        out.push('>');

        let inline = element
            .children
            .iter()
            .all(|node| !matches!(node, Node::Element(_)));

        if inline {
            for node in &element.children {
                write_text(out, node);
            }
        } else {
            out.push('\n');
            let inner_pad = " ".repeat(self.indent * (depth + 1));
            for node in &element.children {
                match node {
                    Node::Element(child) => self.write_element(out, child, depth + 1)?,
                    text => {
                        out.push_str(&inner_pad);
                        write_text(out, text);
                        out.push('\n');
                    }
                }
            }
            out.push_str(&pad);
        }

        writeln!(out, "</{}>", element.name)?;
        Ok(())
    }
}

fn write_text(out: &mut String, node: &Node) {
    match node {
        Node::Text(t) => out.push_str(&escape(&strip_illegal(t))),
        Node::Raw(t) => out.push_str(&strip_illegal(t)),
        Node::Element(_) => {}
    }
}

/// Drops characters XML 1.0 does not allow anywhere in a document.
fn strip_illegal(s: &str) -> String {
    s.chars().filter(|&c| is_xml_char(c)).collect()
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == ':' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ExportError::transform(format!("invalid markup name '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Serializer {
        Serializer::new().with_declaration(false)
    }

    #[test]
    fn test_empty_element_self_closes() {
        let xml = plain().serialize(&Element::new("body")).unwrap();
        assert_eq!(xml, "<body/>\n");
    }

    #[test]
    fn test_declaration() {
        let xml = Serializer::new().serialize(&Element::new("a")).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    }

    #[test]
    fn test_nested_indent() {
        let root = Element::new("a").with_child(Element::new("b").with_child(Element::new("c")));
        let xml = plain().with_indent(2).serialize(&root).unwrap();
        assert_eq!(xml, "<a>\n  <b>\n    <c/>\n  </b>\n</a>\n");
    }

    #[test]
    fn test_text_and_attributes_escaped() {
        let root = Element::new("link")
            .with_attr("title", "\"Q&A\"")
            .with_text("<tag>");
        let xml = plain().serialize(&root).unwrap();
        assert_eq!(xml, "<link title=\"&quot;Q&amp;A&quot;\">&lt;tag&gt;</link>\n");
    }

    #[test]
    fn test_raw_not_double_escaped() {
        let root = Element::new("text").with_raw("a &amp; b");
        let xml = plain().serialize(&root).unwrap();
        assert_eq!(xml, "<text>a &amp; b</text>\n");
    }

    #[test]
    fn test_illegal_chars_stripped() {
        let root = Element::new("text").with_text("a\u{0}b\u{1b}c");
        let xml = plain().serialize(&root).unwrap();
        assert_eq!(xml, "<text>abc</text>\n");
    }

    #[test]
    fn test_invalid_name_is_transform_error() {
        let err = plain().serialize(&Element::new("1abc")).unwrap_err();
        assert!(err.is_transform());

        let err = plain()
            .serialize(&Element::new("a").with_attr("bad name", "x"))
            .unwrap_err();
        assert!(err.is_transform());
    }

    #[test]
    fn test_child_outlives_name() {
        let root = Element::new("body")
            .with_child(Element::text_element("quote", "first"))
            .with_child(Element::text_element("quote", "second"));
        let found = {
            let name = String::from("quote");
            root.child(&name)
        };
        assert_eq!(found.map(Element::text).as_deref(), Some("first"));
        assert!(root.child("missing").is_none());
        assert_eq!(root.children_named("quote").count(), 2);
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut e = Element::new("message").with_attr("id", "1");
        e.set_attr("id", "2");
        assert_eq!(e.attributes.len(), 1);
        assert_eq!(e.attr("id"), Some("2"));
    }

    #[test]
    fn test_navigation() {
        let root = Element::new("a")
            .with_child(Element::text_element("b", "one"))
            .with_child(Element::text_element("b", "two"))
            .with_child(Element::new("c"));
        assert_eq!(root.children_named("b").count(), 2);
        assert_eq!(root.child("b").unwrap().text(), "one");
        assert!(root.child("c").unwrap().is_empty());
        assert!(root.child("d").is_none());
    }
}
