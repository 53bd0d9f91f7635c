//! Field-name lookup tables for extracted records.
//!
//! Each record type has one table, built on first use, mapping the XML name of
//! every declared field (attribute names and scalar child element names) to an
//! accessor over the parsed record. Values are the record's own: booleans
//! render as `true`/`false` and page counts as the parsed integer. Filtering
//! during a parse sees the text as written instead.

use crate::record::{Book, LoanRecord, Reader};
use crate::values::tri_state_label;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use std::borrow::Cow;

type Accessor<T> = fn(&T) -> Option<Cow<'_, str>>;
type FieldTable<T> = IndexMap<&'static str, Accessor<T>>;

fn text(value: &str) -> Option<Cow<'_, str>> {
    Some(Cow::Borrowed(value))
}

fn optional(value: Option<&String>) -> Option<Cow<'_, str>> {
    value.map(|v| Cow::Borrowed(v.as_str()))
}

fn flag(value: Option<bool>) -> Option<Cow<'static, str>> {
    value.map(|v| Cow::Borrowed(tri_state_label(Some(v))))
}

lazy_static! {
    static ref BOOK_FIELDS: FieldTable<Book> = {
        let mut table: FieldTable<Book> = IndexMap::new();
        table.insert("id", |b| text(&b.id));
        table.insert("isbn", |b| optional(b.isbn.as_ref()));
        table.insert("year", |b| optional(b.year.as_ref()));
        table.insert("available", |b| flag(b.available));
        table.insert("language", |b| optional(b.language.as_ref()));
        table.insert("edition", |b| optional(b.edition.as_ref()));
        table.insert("Title", |b| text(&b.title));
        table.insert("Annotation", |b| text(&b.annotation));
        table.insert("Category", |b| text(&b.category));
        table.insert("Publisher", |b| text(&b.publisher));
        table.insert("Pages", |b| Some(Cow::Owned(b.pages.to_string())));
        table
    };
    static ref READER_FIELDS: FieldTable<Reader> = {
        let mut table: FieldTable<Reader> = IndexMap::new();
        table.insert("id", |r| text(&r.id));
        table.insert("registrationDate", |r| optional(r.registration_date.as_ref()));
        table.insert("status", |r| optional(r.status.as_ref()));
        table.insert("membershipType", |r| optional(r.membership_type.as_ref()));
        table.insert("FirstName", |r| text(&r.first_name));
        table.insert("LastName", |r| text(&r.last_name));
        table.insert("MiddleName", |r| optional(r.middle_name.as_ref()));
        table.insert("Faculty", |r| text(&r.faculty));
        table.insert("Department", |r| text(&r.department));
        table.insert("Position", |r| text(&r.position));
        table.insert("Course", |r| optional(r.course.as_ref()));
        table.insert("Email", |r| text(&r.email));
        table.insert("Phone", |r| optional(r.phone.as_ref()));
        table
    };
    static ref LOAN_FIELDS: FieldTable<LoanRecord> = {
        let mut table: FieldTable<LoanRecord> = IndexMap::new();
        table.insert("borrowId", |l| text(&l.borrow_id));
        table.insert("readerId", |l| text(&l.reader_id));
        table.insert("bookId", |l| text(&l.book_id));
        table.insert("borrowDate", |l| text(&l.borrow_date));
        table.insert("dueDate", |l| text(&l.due_date));
        table.insert("returnDate", |l| optional(l.return_date.as_ref()));
        table.insert("status", |l| text(&l.status));
        table.insert("renewable", |l| flag(l.renewable));
        table.insert("Notes", |l| text(&l.notes));
        table
    };
}

/// Lookup of a record's field value by its XML name.
pub trait FieldAccess {
    /// Value of the field named `name`, or `None` when the field is absent or
    /// the name is not a declared field of this record type.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Every declared field name, attributes first, in document-schema order.
    fn field_names() -> Vec<&'static str>;
}

impl FieldAccess for Book {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        BOOK_FIELDS.get(name).and_then(|accessor| accessor(self))
    }

    fn field_names() -> Vec<&'static str> {
        BOOK_FIELDS.keys().copied().collect()
    }
}

impl FieldAccess for Reader {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        READER_FIELDS.get(name).and_then(|accessor| accessor(self))
    }

    fn field_names() -> Vec<&'static str> {
        READER_FIELDS.keys().copied().collect()
    }
}

impl FieldAccess for LoanRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        LOAN_FIELDS.get(name).and_then(|accessor| accessor(self))
    }

    fn field_names() -> Vec<&'static str> {
        LOAN_FIELDS.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_fields() {
        let book = Book {
            id: "b1".to_string(),
            available: Some(false),
            pages: 412,
            title: "Dune".to_string(),
            ..Book::default()
        };
        assert_eq!(book.field("id").as_deref(), Some("b1"));
        assert_eq!(book.field("available").as_deref(), Some("false"));
        assert_eq!(book.field("Pages").as_deref(), Some("412"));
        assert_eq!(book.field("Title").as_deref(), Some("Dune"));
        assert_eq!(book.field("isbn"), None);
        assert_eq!(book.field("title"), None);
        assert_eq!(book.field("Author"), None);
    }

    #[test]
    fn test_reader_optional_fields_absent() {
        let reader = Reader::default();
        assert_eq!(reader.field("MiddleName"), None);
        assert_eq!(reader.field("Email").as_deref(), Some(""));
    }

    #[test]
    fn test_loan_fields() {
        let loan = LoanRecord {
            return_date: Some("2024-03-01".to_string()),
            renewable: None,
            ..LoanRecord::default()
        };
        assert_eq!(loan.field("returnDate").as_deref(), Some("2024-03-01"));
        assert_eq!(loan.field("renewable"), None);
    }

    #[test]
    fn test_field_names_cover_schema() {
        assert_eq!(Book::field_names().len(), 11);
        assert_eq!(Reader::field_names().len(), 13);
        assert_eq!(LoanRecord::field_names().len(), 9);
        assert_eq!(LoanRecord::field_names()[0], "borrowId");
    }
}
