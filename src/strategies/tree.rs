//! Tree strategy: load a navigable node tree and select entities by path.
//!
//! The whole document is parsed into a [`roxmltree::Document`]. Entities are
//! selected with `//Tag` paths, scalar fields are read from attributes and from
//! the full text of the first child element with the field's name.

use super::{
    check_cancelled, StrategyKind, XmlStrategy, AUTHOR_TAG, BOOK_TAG, BORROW_TAG, READER_TAG,
};
use crate::config::CancellationToken;
use crate::criteria::{accepts, SearchCriteria};
use crate::error::Result;
use crate::record::{Author, Book, LoanRecord, Reader};
use crate::source::load_text;
use crate::values::{parse_bool, parse_int};
use roxmltree::{Document, Node, ParsingOptions};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

/// Node-tree parsing strategy.
#[derive(Debug, Clone, Default)]
pub struct TreeStrategy {
    cancellation: Option<CancellationToken>,
}

impl TreeStrategy {
    /// Create the strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `token` between entities.
    #[must_use]
    pub fn with_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.cancellation = token;
        self
    }

    fn parse_entities<T>(
        &self,
        path: &Path,
        entity_tag: &str,
        criteria: Option<&SearchCriteria>,
        build: impl Fn(Node<'_, '_>) -> T,
    ) -> Result<Vec<T>> {
        let text = load_text(path)?;
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(&text, options)?;

        let mut entities = Vec::new();
        for node in select_nodes(doc.root(), &format!("//{entity_tag}")) {
            check_cancelled(self.cancellation.as_ref())?;
            let entity = build(node);
            if accepts(criteria, |key| node_field(node, key)) {
                entities.push(entity);
            }
        }

        debug!(
            strategy = self.name(),
            path = %path.display(),
            entity = entity_tag,
            count = entities.len(),
            "parsed entities"
        );
        Ok(entities)
    }
}

impl XmlStrategy for TreeStrategy {
    fn name(&self) -> &'static str {
        "Tree (node navigation)"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Tree
    }

    fn parse_books(&self, path: &Path, criteria: Option<&SearchCriteria>) -> Result<Vec<Book>> {
        self.parse_entities(path, BOOK_TAG, criteria, |node| Book {
            id: attribute(node, "id").unwrap_or_default(),
            isbn: attribute(node, "isbn"),
            year: attribute(node, "year"),
            available: parse_bool(node.attribute("available")),
            language: attribute(node, "language"),
            edition: attribute(node, "edition"),
            title: child_text(node, "Title").unwrap_or_default(),
            authors: find_children(node, AUTHOR_TAG)
                .map(|author| Author {
                    first_name: child_text(author, "FirstName").unwrap_or_default(),
                    last_name: child_text(author, "LastName").unwrap_or_default(),
                    middle_name: child_text(author, "MiddleName"),
                })
                .collect(),
            annotation: child_text(node, "Annotation").unwrap_or_default(),
            category: child_text(node, "Category").unwrap_or_default(),
            publisher: child_text(node, "Publisher").unwrap_or_default(),
            pages: parse_int(child_text(node, "Pages").as_deref()),
        })
    }

    fn parse_readers(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<Reader>> {
        self.parse_entities(path, READER_TAG, criteria, |node| Reader {
            id: attribute(node, "id").unwrap_or_default(),
            registration_date: attribute(node, "registrationDate"),
            status: attribute(node, "status"),
            membership_type: attribute(node, "membershipType"),
            first_name: child_text(node, "FirstName").unwrap_or_default(),
            last_name: child_text(node, "LastName").unwrap_or_default(),
            middle_name: child_text(node, "MiddleName"),
            faculty: child_text(node, "Faculty").unwrap_or_default(),
            department: child_text(node, "Department").unwrap_or_default(),
            position: child_text(node, "Position").unwrap_or_default(),
            course: child_text(node, "Course"),
            email: child_text(node, "Email").unwrap_or_default(),
            phone: child_text(node, "Phone"),
        })
    }

    fn parse_loan_records(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<LoanRecord>> {
        self.parse_entities(path, BORROW_TAG, criteria, |node| LoanRecord {
            borrow_id: attribute(node, "borrowId").unwrap_or_default(),
            reader_id: attribute(node, "readerId").unwrap_or_default(),
            book_id: attribute(node, "bookId").unwrap_or_default(),
            borrow_date: attribute(node, "borrowDate").unwrap_or_default(),
            due_date: attribute(node, "dueDate").unwrap_or_default(),
            return_date: attribute(node, "returnDate"),
            status: attribute(node, "status").unwrap_or_default(),
            renewable: parse_bool(node.attribute("renewable")),
            notes: child_text(node, "Notes").unwrap_or_default(),
        })
    }
}

/// Filter lookup: the attribute named `key`, else the text of the child
/// element named `key`.
fn node_field<'a>(node: Node<'a, '_>, key: &str) -> Option<Cow<'a, str>> {
    node.attribute(key)
        .map(Cow::Borrowed)
        .or_else(|| find_child(node, key).map(|child| Cow::Owned(inner_text(child))))
}

fn attribute(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    find_child(node, tag).map(inner_text)
}

/// Whether `node` is an element with local name `tag`.
fn is_element_named(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && node.tag_name().name() == tag
}

/// First child element with the given tag name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_element_named(*child, tag))
}

/// All child elements with the given tag name, in document order.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| is_element_named(*child, tag))
}

/// Select elements by a slash-separated path of tag names.
///
/// A leading `//` matches the first step anywhere below `node` (descendant or
/// self); every following step selects child elements.
///
/// # Examples
///
/// ```
/// use catalog_xml::strategies::tree::select_nodes;
/// use roxmltree::Document;
///
/// let doc = Document::parse("<Library><Shelf><Book id='1'/><Book id='2'/></Shelf></Library>").unwrap();
/// assert_eq!(select_nodes(doc.root(), "//Book").len(), 2);
/// assert_eq!(select_nodes(doc.root_element(), "Shelf/Book").len(), 2);
/// ```
#[must_use]
pub fn select_nodes<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
    let (mut current, steps) = match path.strip_prefix("//") {
        Some(rest) => {
            let (first, tail) = rest.split_once('/').unwrap_or((rest, ""));
            let matches = node
                .descendants()
                .filter(|candidate| is_element_named(*candidate, first))
                .collect();
            (matches, tail)
        },
        None => (vec![node], path),
    };

    for step in steps.split('/').filter(|step| !step.is_empty()) {
        current = current
            .into_iter()
            .flat_map(|parent| {
                parent
                    .children()
                    .filter(move |child| is_element_named(*child, step))
            })
            .collect();
    }
    current
}

/// Concatenated text of all text nodes below `node`.
#[must_use]
pub fn inner_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_text_concatenates_descendants() {
        let doc = Document::parse("<Title>The <b>Hobbit</b><![CDATA[!]]></Title>").unwrap();
        assert_eq!(inner_text(doc.root_element()), "The Hobbit!");
    }

    #[test]
    fn test_find_child_ignores_grandchildren() {
        let doc = Document::parse("<Book><Author><FirstName>A</FirstName></Author></Book>")
            .unwrap();
        let book = doc.root_element();
        assert!(find_child(book, "FirstName").is_none());
        assert!(find_child(book, "Author").is_some());
    }

    #[test]
    fn test_node_field_prefers_attribute() {
        let doc = Document::parse(r#"<Book status="attr"><status>child</status><Title>T</Title></Book>"#)
            .unwrap();
        let book = doc.root_element();
        assert_eq!(node_field(book, "status").as_deref(), Some("attr"));
        assert_eq!(node_field(book, "Title").as_deref(), Some("T"));
        assert_eq!(node_field(book, "missing"), None);
    }

    #[test]
    fn test_select_nodes_nested_entities() {
        let doc = Document::parse(
            "<Library><Books><Book id='1'/></Books><Archive><Old><Book id='2'/></Old></Archive></Library>",
        )
        .unwrap();
        let ids: Vec<_> = select_nodes(doc.root(), "//Book")
            .into_iter()
            .filter_map(|n| n.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
