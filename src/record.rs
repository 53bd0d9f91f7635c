//! Library record structures extracted from catalog documents.
//!
//! This module provides the plain data types produced by every parsing strategy:
//! - [`Book`]: A catalogued book with its owned [`Author`] list
//! - [`Reader`]: A registered library reader
//! - [`LoanRecord`]: A single loan of a book to a reader (`<Borrow>` element)
//!
//! Records carry no behavior beyond construction and display formatting.
//! Optional values stay optional: an absent `year` is `None`, never `""`, and
//! an absent `available` flag is `None`, never `false`.
//!
//! # Examples
//!
//! ```
//! use catalog_xml::{Author, Book};
//!
//! let book = Book {
//!     id: "b1".to_string(),
//!     title: "Dune".to_string(),
//!     year: Some("1965".to_string()),
//!     authors: vec![Author::new("Frank", "Herbert")],
//!     ..Book::default()
//! };
//!
//! assert_eq!(book.to_string(), "Dune - Frank Herbert (1965)");
//! ```

use serde::Serialize;
use std::fmt;

/// A book entry (`<Book>` element).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Book {
    /// Identifier (`id` attribute), unique within a document
    pub id: String,
    /// ISBN (`isbn` attribute)
    pub isbn: Option<String>,
    /// Publication year, kept as text (`year` attribute)
    pub year: Option<String>,
    /// Availability flag (`available` attribute); `None` when absent or unparsable
    pub available: Option<bool>,
    /// Language (`language` attribute)
    pub language: Option<String>,
    /// Edition (`edition` attribute)
    pub edition: Option<String>,
    /// Title (`<Title>` child)
    pub title: String,
    /// Authors in document order (`<Author>` children)
    pub authors: Vec<Author>,
    /// Annotation (`<Annotation>` child)
    pub annotation: String,
    /// Category (`<Category>` child)
    pub category: String,
    /// Publisher (`<Publisher>` child)
    pub publisher: String,
    /// Page count (`<Pages>` child); 0 when missing or not a number
    pub pages: i32,
}

impl Book {
    /// Authors joined as displayed, e.g. `"Frank Herbert, Brian Herbert"`.
    #[must_use]
    pub fn author_list(&self) -> String {
        self.authors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.title,
            self.author_list(),
            self.year.as_deref().unwrap_or_default()
        )
    }
}

/// A book author. Authors have no identity outside the book that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Author {
    /// First name (`<FirstName>`)
    pub first_name: String,
    /// Last name (`<LastName>`)
    pub last_name: String,
    /// Middle name (`<MiddleName>`)
    pub middle_name: Option<String>,
}

impl Author {
    /// Create an author without a middle name.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Author {
            first_name: first_name.into(),
            last_name: last_name.into(),
            middle_name: None,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.middle_name {
            Some(middle) => write!(f, "{} {} {}", self.first_name, middle, self.last_name),
            None => write!(f, "{} {}", self.first_name, self.last_name),
        }
    }
}

/// A registered reader (`<Reader>` element).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Reader {
    /// Identifier (`id` attribute)
    pub id: String,
    /// Registration date, untyped (`registrationDate` attribute)
    pub registration_date: Option<String>,
    /// Status (`status` attribute)
    pub status: Option<String>,
    /// Membership type (`membershipType` attribute)
    pub membership_type: Option<String>,
    /// First name (`<FirstName>`)
    pub first_name: String,
    /// Last name (`<LastName>`)
    pub last_name: String,
    /// Middle name (`<MiddleName>`)
    pub middle_name: Option<String>,
    /// Faculty (`<Faculty>`)
    pub faculty: String,
    /// Department (`<Department>`)
    pub department: String,
    /// Position (`<Position>`)
    pub position: String,
    /// Course (`<Course>`)
    pub course: Option<String>,
    /// Email (`<Email>`)
    pub email: String,
    /// Phone (`<Phone>`)
    pub phone: Option<String>,
}

impl Reader {
    /// Full name as `"{last} {first}"`, followed by the middle name when present.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{} {} {}", self.last_name, self.first_name, middle),
            None => format!("{} {}", self.last_name, self.first_name),
        }
    }
}

impl fmt::Display for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}, {}",
            self.full_name(),
            self.position,
            self.department
        )
    }
}

/// A loan transaction (`<Borrow>` element).
///
/// Reader and book identifiers are copied verbatim; they are not checked
/// against the books or readers present in the document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LoanRecord {
    /// Loan identifier (`borrowId` attribute)
    pub borrow_id: String,
    /// Borrowing reader (`readerId` attribute)
    pub reader_id: String,
    /// Borrowed book (`bookId` attribute)
    pub book_id: String,
    /// Borrow date (`borrowDate` attribute)
    pub borrow_date: String,
    /// Due date (`dueDate` attribute)
    pub due_date: String,
    /// Return date (`returnDate` attribute); `None` while the loan is open
    pub return_date: Option<String>,
    /// Free-form status (`status` attribute)
    pub status: String,
    /// Renewable flag (`renewable` attribute); `None` when absent or unparsable
    pub renewable: Option<bool>,
    /// Notes (`<Notes>` child)
    pub notes: String,
}

impl LoanRecord {
    /// Whether the book has not been returned yet.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

impl fmt::Display for LoanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loan #{}: Reader {} - Book {} ({})",
            self.borrow_id, self.reader_id, self.book_id, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_display_with_multiple_authors() {
        let book = Book {
            title: "Good Omens".to_string(),
            year: Some("1990".to_string()),
            authors: vec![
                Author::new("Terry", "Pratchett"),
                Author::new("Neil", "Gaiman"),
            ],
            ..Book::default()
        };
        assert_eq!(
            book.to_string(),
            "Good Omens - Terry Pratchett, Neil Gaiman (1990)"
        );
    }

    #[test]
    fn test_book_display_without_year() {
        let book = Book {
            title: "Untitled".to_string(),
            ..Book::default()
        };
        assert_eq!(book.to_string(), "Untitled -  ()");
    }

    #[test]
    fn test_author_display_with_middle_name() {
        let author = Author {
            middle_name: Some("Ronald Reuel".to_string()),
            ..Author::new("John", "Tolkien")
        };
        assert_eq!(author.to_string(), "John Ronald Reuel Tolkien");
    }

    #[test]
    fn test_reader_full_name() {
        let mut reader = Reader {
            first_name: "Taras".to_string(),
            last_name: "Shevchenko".to_string(),
            position: "Student".to_string(),
            department: "Philology".to_string(),
            ..Reader::default()
        };
        assert_eq!(reader.full_name(), "Shevchenko Taras");
        assert_eq!(reader.to_string(), "Shevchenko Taras - Student, Philology");

        reader.middle_name = Some("Hryhorovych".to_string());
        assert_eq!(reader.full_name(), "Shevchenko Taras Hryhorovych");
    }

    #[test]
    fn test_loan_display_and_open_state() {
        let loan = LoanRecord {
            borrow_id: "L7".to_string(),
            reader_id: "r2".to_string(),
            book_id: "b9".to_string(),
            status: "active".to_string(),
            ..LoanRecord::default()
        };
        assert_eq!(loan.to_string(), "Loan #L7: Reader r2 - Book b9 (active)");
        assert!(loan.is_open());
    }
}
