//! Structural inspection of an arbitrary document.
//!
//! These helpers work on any well-formed document, not only on library
//! catalogues: they list the element vocabulary, the attributes of a tag and
//! run a generic search by tag and attribute value.
//!
//! # Examples
//!
//! ```
//! use catalog_xml::document::Document;
//! use catalog_xml::inspect::{attribute_names, element_tags, search_elements};
//!
//! let doc = Document::parse(
//!     r#"<Library><Book id="b1" year="1965"><Title>Dune</Title></Book></Library>"#,
//! )?;
//! assert_eq!(element_tags(&doc), vec!["Book", "Title"]);
//! assert_eq!(attribute_names(&doc, "Book"), vec!["id", "year"]);
//!
//! let hits = search_elements(&doc, "Book", Some(("year", "196")));
//! assert_eq!(hits[0].children, vec![("Title".to_string(), "Dune".to_string())]);
//! # Ok::<(), catalog_xml::CatalogError>(())
//! ```

use crate::criteria::contains_ignore_case;
use crate::document::{Document, Element};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Child values longer than this many characters are truncated.
pub const MAX_CHILD_VALUE_CHARS: usize = 100;

/// Flat view of one element found by [`search_elements`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSummary {
    /// Local name of the element.
    pub tag: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Direct child elements with their trimmed, possibly truncated text.
    pub children: Vec<(String, String)>,
}

impl ElementSummary {
    fn from_element(element: &Element) -> Self {
        ElementSummary {
            tag: element.name().to_string(),
            attributes: element
                .attributes()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            children: element
                .child_elements()
                .map(|child| (child.name().to_string(), truncate(child.value().trim())))
                .collect(),
        }
    }
}

impl fmt::Display for ElementSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{value}\"")?;
        }
        f.write_str(">")?;
        for (name, value) in &self.children {
            write!(f, "\n  {name}: {value}")?;
        }
        Ok(())
    }
}

fn truncate(value: &str) -> String {
    match value.char_indices().nth(MAX_CHILD_VALUE_CHARS) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}

/// Distinct names of every element below the root, sorted.
#[must_use]
pub fn element_tags(doc: &Document) -> Vec<String> {
    doc.root()
        .descendants()
        .map(|element| element.name().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted attribute names of the first element named `tag`.
///
/// Returns an empty list when no element has that name.
#[must_use]
pub fn attribute_names(doc: &Document, tag: &str) -> Vec<String> {
    let Some(element) = doc.all_elements().find(|element| element.name() == tag) else {
        return Vec::new();
    };
    let mut names: Vec<String> = element
        .attributes()
        .map(|(name, _)| name.to_string())
        .collect();
    names.sort();
    names
}

/// Every element named `tag`, optionally restricted to those whose attribute
/// contains a value (case-insensitive).
///
/// A blank value disables the attribute restriction.
#[must_use]
pub fn search_elements(
    doc: &Document,
    tag: &str,
    attribute: Option<(&str, &str)>,
) -> Vec<ElementSummary> {
    let restriction = attribute.filter(|(_, value)| !value.trim().is_empty());
    doc.all_elements()
        .filter(|element| element.name() == tag)
        .filter(|element| {
            restriction.map_or(true, |(name, value)| {
                element
                    .attribute(name)
                    .is_some_and(|actual| contains_ignore_case(actual, value))
            })
        })
        .map(ElementSummary::from_element)
        .collect()
}
