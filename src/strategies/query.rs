//! Query strategy: load an owned object model and select with combinators.
//!
//! The document is materialized as a [`Document`] and entities are selected
//! with `descendants` / `element` / `elements` queries. The output is the same
//! as the [tree strategy](super::tree); only the traversal differs.

use super::{
    check_cancelled, StrategyKind, XmlStrategy, AUTHOR_TAG, BOOK_TAG, BORROW_TAG, READER_TAG,
};
use crate::config::CancellationToken;
use crate::criteria::{accepts, SearchCriteria};
use crate::document::{Document, Element};
use crate::error::Result;
use crate::record::{Author, Book, LoanRecord, Reader};
use crate::values::{parse_bool, parse_int};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

/// Object-model query strategy.
#[derive(Debug, Clone, Default)]
pub struct QueryStrategy {
    cancellation: Option<CancellationToken>,
}

impl QueryStrategy {
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

    fn query<T>(
        &self,
        path: &Path,
        entity_tag: &str,
        criteria: Option<&SearchCriteria>,
        project: impl Fn(&Element) -> T,
    ) -> Result<Vec<T>> {
        let doc = Document::load(path)?;
        let token = self.cancellation.as_ref();

        let entities = doc
            .descendants(entity_tag)
            .filter(|element| accepts(criteria, |key| element_field(element, key)))
            .map(|element| check_cancelled(token).map(|()| project(element)))
            .collect::<Result<Vec<T>>>()?;

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

impl XmlStrategy for QueryStrategy {
    fn name(&self) -> &'static str {
        "Query (object model)"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Query
    }

    fn parse_books(&self, path: &Path, criteria: Option<&SearchCriteria>) -> Result<Vec<Book>> {
        self.query(path, BOOK_TAG, criteria, |book| Book {
            id: attr(book, "id").unwrap_or_default(),
            isbn: attr(book, "isbn"),
            year: attr(book, "year"),
            available: parse_bool(book.attribute("available")),
            language: attr(book, "language"),
            edition: attr(book, "edition"),
            title: value(book, "Title").unwrap_or_default(),
            authors: book
                .elements(AUTHOR_TAG)
                .map(|author| Author {
                    first_name: value(author, "FirstName").unwrap_or_default(),
                    last_name: value(author, "LastName").unwrap_or_default(),
                    middle_name: value(author, "MiddleName"),
                })
                .collect(),
            annotation: value(book, "Annotation").unwrap_or_default(),
            category: value(book, "Category").unwrap_or_default(),
            publisher: value(book, "Publisher").unwrap_or_default(),
            pages: parse_int(value(book, "Pages").as_deref()),
        })
    }

    fn parse_readers(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<Reader>> {
        self.query(path, READER_TAG, criteria, |reader| Reader {
            id: attr(reader, "id").unwrap_or_default(),
            registration_date: attr(reader, "registrationDate"),
            status: attr(reader, "status"),
            membership_type: attr(reader, "membershipType"),
            first_name: value(reader, "FirstName").unwrap_or_default(),
            last_name: value(reader, "LastName").unwrap_or_default(),
            middle_name: value(reader, "MiddleName"),
            faculty: value(reader, "Faculty").unwrap_or_default(),
            department: value(reader, "Department").unwrap_or_default(),
            position: value(reader, "Position").unwrap_or_default(),
            course: value(reader, "Course"),
            email: value(reader, "Email").unwrap_or_default(),
            phone: value(reader, "Phone"),
        })
    }

    fn parse_loan_records(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<LoanRecord>> {
        self.query(path, BORROW_TAG, criteria, |borrow| LoanRecord {
            borrow_id: attr(borrow, "borrowId").unwrap_or_default(),
            reader_id: attr(borrow, "readerId").unwrap_or_default(),
            book_id: attr(borrow, "bookId").unwrap_or_default(),
            borrow_date: attr(borrow, "borrowDate").unwrap_or_default(),
            due_date: attr(borrow, "dueDate").unwrap_or_default(),
            return_date: attr(borrow, "returnDate"),
            status: attr(borrow, "status").unwrap_or_default(),
            renewable: parse_bool(borrow.attribute("renewable")),
            notes: value(borrow, "Notes").unwrap_or_default(),
        })
    }
}

fn element_field<'a>(element: &'a Element, key: &str) -> Option<Cow<'a, str>> {
    element
        .attribute(key)
        .map(Cow::Borrowed)
        .or_else(|| element.element(key).map(|child| Cow::Owned(child.value())))
}

fn attr(element: &Element, name: &str) -> Option<String> {
    element.attribute(name).map(str::to_string)
}

fn value(element: &Element, name: &str) -> Option<String> {
    element.element(name).map(Element::value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_field_fallback() {
        let doc = Document::parse(
            r#"<Borrow borrowId="L1" status="open"><Notes>late again</Notes></Borrow>"#,
        )
        .unwrap();
        let borrow = doc.root();
        assert_eq!(element_field(borrow, "status").as_deref(), Some("open"));
        assert_eq!(element_field(borrow, "Notes").as_deref(), Some("late again"));
        assert_eq!(element_field(borrow, "returnDate"), None);
    }
}
