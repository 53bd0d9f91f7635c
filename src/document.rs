//! Owned whole-document object model.
//!
//! [`Document`] is built from a `quick-xml` event stream into a tree of owned
//! [`Element`]s and is queried with iterator-based selection, in the spirit of
//! an `XDocument`:
//!
//! ```
//! use catalog_xml::document::Document;
//!
//! let doc = Document::parse(
//!     r#"<Library><Book id="b1"><Title>Dune</Title></Book></Library>"#,
//! )?;
//!
//! let titles: Vec<String> = doc
//!     .descendants("Book")
//!     .filter_map(|book| book.element("Title"))
//!     .map(|title| title.value())
//!     .collect();
//!
//! assert_eq!(titles, vec!["Dune"]);
//! # Ok::<(), catalog_xml::CatalogError>(())
//! ```
//!
//! Element names are stored by local name (namespace prefix removed);
//! attribute names keep their full written form. Line endings in text are
//! normalized to `\n` and literal whitespace in attribute values to spaces.
//! General entities declared in the internal DTD subset are expanded as text.

use crate::error::{CatalogError, Result};
use crate::source::load_text;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesCData, BytesStart, BytesText, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::path::Path;

/// A parsed document with exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

/// Child content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    /// Nested element
    Element(Element),
    /// Character data (text or CDATA, entities resolved)
    Text(String),
}

/// An element with its attributes and children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Document {
    /// Parse a document from a string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MalformedInput`] if the text is not a
    /// well-formed document with a single root element.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let decoder = reader.decoder();
        let mut entities = Entities::default();
        let mut open: Vec<Element> = Vec::new();
        let mut top: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => open.push(Element::from_start(&start, decoder, &entities)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start, decoder, &entities)?;
                    attach(&mut open, &mut top, element)?;
                },
                Event::End(end) => {
                    let element = open.pop().ok_or_else(|| {
                        CatalogError::MalformedInput(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(end.name().as_ref())
                        ))
                    })?;
                    attach(&mut open, &mut top, element)?;
                },
                Event::Text(text) => {
                    let value = decode_text(&text, decoder, &entities)?;
                    push_text(&mut open, value)?;
                },
                Event::CData(data) => {
                    let value = decode_cdata(&data, decoder)?;
                    push_text(&mut open, value)?;
                },
                Event::DocType(doctype) => entities = Entities::from_doctype(&doctype, decoder)?,
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) => {},
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(CatalogError::MalformedInput(format!(
                "unexpected end of document inside <{}>",
                unclosed.name
            )));
        }
        let root = top.ok_or_else(|| {
            CatalogError::MalformedInput("document has no root element".to_string())
        })?;
        Ok(Document { root })
    }

    /// Load and parse the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the path cannot be read and
    /// [`CatalogError::MalformedInput`] if the document is not well-formed.
    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&load_text(path)?)
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All elements in document order, root included.
    pub fn all_elements(&self) -> impl Iterator<Item = &Element> {
        std::iter::once(&self.root).chain(self.root.descendants())
    }

    /// All elements named `name` in document order, root included.
    pub fn descendants<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.all_elements().filter(move |element| element.name == name)
    }
}

impl Element {
    fn from_start(start: &BytesStart<'_>, decoder: Decoder, entities: &Entities) -> Result<Self> {
        Ok(Element {
            name: element_name(start, decoder)?,
            attributes: collect_attributes(start, decoder, entities)?,
            children: Vec::new(),
        })
    }

    /// Local name of the element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes as `(name, value)` pairs, in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Child elements named `name`.
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements()
            .filter(move |element| element.name == name)
    }

    /// First child element named `name`.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|element| element.name == name)
    }

    /// Elements below this one in document order, excluding itself.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(&self.children)
    }

    /// Concatenated text of every text node below this element.
    #[must_use]
    pub fn value(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
}

/// Pre-order iterator over elements.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Descendants<'a> {
    fn new(nodes: &'a [Node]) -> Self {
        Descendants {
            stack: vec![nodes.iter()],
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(Node::Element(element)) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                },
                Some(Node::Text(_)) => {},
                None => {
                    self.stack.pop();
                },
            }
        }
    }
}

fn attach(open: &mut [Element], top: &mut Option<Element>, element: Element) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if top.is_none() => *top = Some(element),
        None => {
            return Err(CatalogError::MalformedInput(format!(
                "second root element <{}>",
                element.name
            )))
        },
    }
    Ok(())
}

fn push_text(open: &mut [Element], text: String) -> Result<()> {
    match open.last_mut() {
        Some(parent) => {
            // Merge with a preceding text node so split character data reads as one.
            if let Some(Node::Text(previous)) = parent.children.last_mut() {
                previous.push_str(&text);
            } else {
                parent.children.push(Node::Text(text));
            }
            Ok(())
        },
        None if text.trim().is_empty() => Ok(()),
        None => Err(CatalogError::MalformedInput(
            "text outside the root element".to_string(),
        )),
    }
}

/// General entities declared in a document type declaration.
///
/// Only internal declarations with a quoted literal value are kept; the first
/// declaration of a name wins. Parameter and external entities are skipped.
#[derive(Debug, Clone, Default)]
pub(crate) struct Entities {
    declared: Vec<(String, String)>,
}

impl Entities {
    /// Collect the declarations of a `DocType` event.
    pub(crate) fn from_doctype(doctype: &BytesText<'_>, decoder: Decoder) -> Result<Self> {
        let text = decoder.decode(doctype)?;
        let mut entities = Entities::default();
        let mut rest: &str = &text;

        while let Some(start) = rest.find("<!ENTITY") {
            rest = rest[start + "<!ENTITY".len()..].trim_start();
            if rest.starts_with('%') {
                continue;
            }
            let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (name, tail) = rest.split_at(name_end);
            rest = tail.trim_start();

            let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                continue;
            };
            let body = &rest[1..];
            let close = body.find(quote).ok_or_else(|| {
                CatalogError::MalformedInput(format!("unterminated value for entity '{name}'"))
            })?;
            let value = unescape(&body[..close], &entities)?.into_owned();
            if entities.resolve(name).is_none() {
                entities.declared.push((name.to_string(), value));
            }
            rest = &body[close + 1..];
        }
        Ok(entities)
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        self.declared
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Local name of a start tag.
pub(crate) fn element_name(start: &BytesStart<'_>, decoder: Decoder) -> Result<String> {
    Ok(decoder.decode(start.local_name().as_ref())?.into_owned())
}

/// Attributes of a start tag, namespace declarations excluded.
pub(crate) fn collect_attributes(
    start: &BytesStart<'_>,
    decoder: Decoder,
    entities: &Entities,
) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = decoder.decode(attr.key.as_ref())?.into_owned();
        let raw = decoder.decode(&attr.value)?;
        let normalized = normalize_line_endings(&raw).replace(['\t', '\n'], " ");
        attributes.push((key, unescape(&normalized, entities)?.into_owned()));
    }
    Ok(attributes)
}

/// Decoded, unescaped text content.
pub(crate) fn decode_text(
    text: &BytesText<'_>,
    decoder: Decoder,
    entities: &Entities,
) -> Result<String> {
    let raw = decoder.decode(text)?;
    Ok(unescape(&normalize_line_endings(&raw), entities)?.into_owned())
}

/// Decoded CDATA content, taken literally.
pub(crate) fn decode_cdata(data: &BytesCData<'_>, decoder: Decoder) -> Result<String> {
    let raw = decoder.decode(data)?;
    Ok(normalize_line_endings(&raw).into_owned())
}

fn unescape<'a>(raw: &'a str, entities: &Entities) -> Result<Cow<'a, str>> {
    quick_xml::escape::unescape_with(raw, |name| entities.resolve(name))
        .map_err(|err| CatalogError::MalformedInput(err.to_string()))
}

fn normalize_line_endings(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"<?xml version="1.0"?>
<lib:Library xmlns:lib="urn:library">
  <!-- catalogue -->
  <lib:Book id="b1" year="1965"><Title>Dune</Title></lib:Book>
  <Shelf><Book id="b2"><Title>Emma &amp; Co</Title></Book></Shelf>
</lib:Library>"#;

    #[test]
    fn test_descendants_in_document_order() {
        let doc = Document::parse(LIBRARY).unwrap();
        let ids: Vec<_> = doc
            .descendants("Book")
            .filter_map(|book| book.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert_eq!(doc.root().name(), "Library");
    }

    #[test]
    fn test_namespace_declarations_are_not_attributes() {
        let doc = Document::parse(LIBRARY).unwrap();
        assert_eq!(doc.root().attributes().count(), 0);
    }

    #[test]
    fn test_value_resolves_entities_and_cdata() {
        let doc = Document::parse("<T>a &lt; b<![CDATA[ & c]]><i>!</i></T>").unwrap();
        assert_eq!(doc.root().value(), "a < b & c!");
        assert_eq!(doc.root().children.len(), 2);
    }

    #[test]
    fn test_element_and_elements() {
        let doc = Document::parse("<Book><Author>1</Author><Title/><Author>2</Author></Book>")
            .unwrap();
        let root = doc.root();
        assert_eq!(root.elements("Author").count(), 2);
        assert_eq!(root.element("Title").map(Element::value), Some(String::new()));
        assert!(root.element("Pages").is_none());
    }

    #[test]
    fn test_internal_entities_are_expanded() {
        let doc = Document::parse(
            r#"<!DOCTYPE T [
  <!ENTITY % skipped "p">
  <!ENTITY pub "Chilton &amp; Co">
  <!ENTITY ext SYSTEM "ext.xml">
  <!ENTITY pub 'later'>
]>
<T by="&pub;">&pub; Books</T>"#,
        )
        .unwrap();
        assert_eq!(doc.root().value(), "Chilton & Co Books");
        assert_eq!(doc.root().attribute("by"), Some("Chilton & Co"));
    }

    #[test]
    fn test_undeclared_entity_is_malformed() {
        let result = Document::parse("<T>&pub;</T>");
        assert!(matches!(result, Err(CatalogError::MalformedInput(_))));
    }

    #[test]
    fn test_line_endings_normalized() {
        let doc = Document::parse("<T a=\"x\ty\">one\r\ntwo\rthree</T>").unwrap();
        assert_eq!(doc.root().value(), "one\ntwo\nthree");
        assert_eq!(doc.root().attribute("a"), Some("x y"));
    }

    #[test]
    fn test_malformed_documents() {
        for bad in [
            "<Library><Book></Library>",
            "<Library><Book>",
            "<a/><b/>",
            "",
            "stray <a/>",
            "<a x='1' x='2'/>",
        ] {
            assert!(
                matches!(Document::parse(bad), Err(CatalogError::MalformedInput(_))),
                "expected malformed: {bad}"
            );
        }
    }
}
