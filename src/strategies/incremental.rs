//! Incremental strategy: one forward pass over the token stream.
//!
//! The document is never materialized. A [`StreamState`] tracks the entity
//! being assembled, the author being assembled inside a book, and the field
//! element whose text is being captured. It changes only on three events:
//!
//! - **start tag**: an entity tag begins a new entity (attribute fields are
//!   filled at once); an `Author` child of a book begins a new author; any
//!   other direct child of the entity (or of the author) starts capturing
//!   that field's text.
//! - **text**: appended to the captured field, otherwise ignored. Text split
//!   across several events (entities, CDATA sections, comments) is joined.
//! - **end tag**: closing the captured field stores its text (the first
//!   occurrence of a field wins); closing the author appends it to the book;
//!   closing the entity evaluates the criteria and keeps the record when it
//!   matches.
//!
//! Criteria see the entity as written: its raw attribute values and the raw
//! text of its first direct child of each name (`Author` included), not the
//! parsed record. Every start tag's attributes and every comment, processing
//! instruction and declaration are decoded, so the document is checked as a
//! whole even where nothing is extracted.
//!
//! Memory use is bounded by the size of one entity. An entity still open when
//! the stream ends is discarded and the parse fails as malformed input.

use super::{
    check_cancelled, StrategyKind, XmlStrategy, AUTHOR_TAG, BOOK_TAG, BORROW_TAG, READER_TAG,
};
use crate::config::CancellationToken;
use crate::criteria::{accepts, SearchCriteria};
use crate::document::{collect_attributes, decode_cdata, decode_text, element_name, Entities};
use crate::error::{CatalogError, Result};
use crate::record::{Author, Book, LoanRecord, Reader};
use crate::source::open_stream;
use crate::values::{parse_bool, parse_int};
use quick_xml::events::Event;
use std::borrow::Cow;
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Streaming parsing strategy.
#[derive(Debug, Clone, Default)]
pub struct IncrementalStrategy {
    cancellation: Option<CancellationToken>,
}

impl IncrementalStrategy {
    /// Create the strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `token` between token events.
    #[must_use]
    pub fn with_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.cancellation = token;
        self
    }

    /// Stream entities of type `E` from any buffered source.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MalformedInput`] if the stream is not a
    /// well-formed document and [`CatalogError::Cancelled`] on cancellation.
    pub fn parse_stream<E, R>(&self, source: R, criteria: Option<&SearchCriteria>) -> Result<Vec<E>>
    where
        E: StreamRecord,
        R: BufRead,
    {
        let mut reader = quick_xml::Reader::from_reader(source);
        let decoder = reader.decoder();
        let mut entities = Entities::default();
        let mut state = StreamState::<E>::new(criteria);
        let mut buf = Vec::new();

        loop {
            check_cancelled(self.cancellation.as_ref())?;
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    let name = element_name(&start, decoder)?;
                    state.on_start(&name, collect_attributes(&start, decoder, &entities)?)?;
                },
                Event::Empty(start) => {
                    let name = element_name(&start, decoder)?;
                    state.on_start(&name, collect_attributes(&start, decoder, &entities)?)?;
                    state.on_end();
                },
                Event::End(_) => state.on_end(),
                Event::Text(text) => state.on_text(&decode_text(&text, decoder, &entities)?)?,
                Event::CData(data) => state.on_text(&decode_cdata(&data, decoder)?)?,
                Event::DocType(doctype) => entities = Entities::from_doctype(&doctype, decoder)?,
                Event::Comment(text) | Event::PI(text) => {
                    decoder.decode(&text)?;
                },
                Event::Decl(decl) => {
                    decoder.decode(&decl)?;
                },
                Event::Eof => break,
            }
            buf.clear();
        }

        state.finish()
    }

    fn parse_path<E: StreamRecord>(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<E>> {
        let source = open_stream(path)?;
        let entities = self.parse_stream::<E, _>(source, criteria)?;
        debug!(
            strategy = self.name(),
            path = %path.display(),
            entity = E::TAG,
            count = entities.len(),
            "parsed entities"
        );
        Ok(entities)
    }
}

impl XmlStrategy for IncrementalStrategy {
    fn name(&self) -> &'static str {
        "Incremental (event stream)"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Incremental
    }

    fn parse_books(&self, path: &Path, criteria: Option<&SearchCriteria>) -> Result<Vec<Book>> {
        self.parse_path(path, criteria)
    }

    fn parse_readers(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<Reader>> {
        self.parse_path(path, criteria)
    }

    fn parse_loan_records(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<LoanRecord>> {
        self.parse_path(path, criteria)
    }
}

/// A record type the incremental strategy can assemble from stream events.
pub trait StreamRecord: fmt::Debug + Sized {
    /// Element name of the entity.
    const TAG: &'static str;

    /// Whether `Author` children are collected into the record.
    const HAS_AUTHORS: bool = false;

    /// Start a record from its start-tag attributes.
    fn from_attributes(attributes: &[(String, String)]) -> Self;

    /// Store the text of the direct child element `field`.
    fn assign(&mut self, field: &str, text: String);

    /// Append a completed author.
    fn push_author(&mut self, _author: Author) {}
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn owned(attributes: &[(String, String)], name: &str) -> Option<String> {
    lookup(attributes, name).map(str::to_string)
}

impl StreamRecord for Book {
    const TAG: &'static str = BOOK_TAG;
    const HAS_AUTHORS: bool = true;

    fn from_attributes(attributes: &[(String, String)]) -> Self {
        Book {
            id: owned(attributes, "id").unwrap_or_default(),
            isbn: owned(attributes, "isbn"),
            year: owned(attributes, "year"),
            available: parse_bool(lookup(attributes, "available")),
            language: owned(attributes, "language"),
            edition: owned(attributes, "edition"),
            ..Book::default()
        }
    }

    fn assign(&mut self, field: &str, text: String) {
        match field {
            "Title" => self.title = text,
            "Annotation" => self.annotation = text,
            "Category" => self.category = text,
            "Publisher" => self.publisher = text,
            "Pages" => self.pages = parse_int(Some(&text)),
            _ => {},
        }
    }

    fn push_author(&mut self, author: Author) {
        self.authors.push(author);
    }
}

impl StreamRecord for Reader {
    const TAG: &'static str = READER_TAG;

    fn from_attributes(attributes: &[(String, String)]) -> Self {
        Reader {
            id: owned(attributes, "id").unwrap_or_default(),
            registration_date: owned(attributes, "registrationDate"),
            status: owned(attributes, "status"),
            membership_type: owned(attributes, "membershipType"),
            ..Reader::default()
        }
    }

    fn assign(&mut self, field: &str, text: String) {
        match field {
            "FirstName" => self.first_name = text,
            "LastName" => self.last_name = text,
            "MiddleName" => self.middle_name = Some(text),
            "Faculty" => self.faculty = text,
            "Department" => self.department = text,
            "Position" => self.position = text,
            "Course" => self.course = Some(text),
            "Email" => self.email = text,
            "Phone" => self.phone = Some(text),
            _ => {},
        }
    }
}

impl StreamRecord for LoanRecord {
    const TAG: &'static str = BORROW_TAG;

    fn from_attributes(attributes: &[(String, String)]) -> Self {
        LoanRecord {
            borrow_id: owned(attributes, "borrowId").unwrap_or_default(),
            reader_id: owned(attributes, "readerId").unwrap_or_default(),
            book_id: owned(attributes, "bookId").unwrap_or_default(),
            borrow_date: owned(attributes, "borrowDate").unwrap_or_default(),
            due_date: owned(attributes, "dueDate").unwrap_or_default(),
            return_date: owned(attributes, "returnDate"),
            status: owned(attributes, "status").unwrap_or_default(),
            renewable: parse_bool(lookup(attributes, "renewable")),
            notes: String::new(),
        }
    }

    fn assign(&mut self, field: &str, text: String) {
        if field == "Notes" {
            self.notes = text;
        }
    }
}

fn assign_author(author: &mut Author, field: &str, text: String) {
    match field {
        "FirstName" => author.first_name = text,
        "LastName" => author.last_name = text,
        "MiddleName" => author.middle_name = Some(text),
        _ => {},
    }
}

/// An element being assembled, with its nesting depth and the raw values
/// seen so far.
#[derive(Debug)]
struct Open<T> {
    value: T,
    depth: usize,
    attributes: Vec<(String, String)>,
    /// Text of the first direct child of each name.
    fields: Vec<(String, String)>,
    /// All character data below the element.
    text: String,
}

impl<T> Open<T> {
    fn new(value: T, depth: usize, attributes: Vec<(String, String)>) -> Self {
        Open {
            value,
            depth,
            attributes,
            fields: Vec::new(),
            text: String::new(),
        }
    }

    /// Record the raw text of `field`; `false` if the field was already seen.
    fn claim(&mut self, field: &str, text: &str) -> bool {
        if lookup(&self.fields, field).is_some() {
            return false;
        }
        self.fields.push((field.to_string(), text.to_string()));
        true
    }

    /// Raw value of `key`: the attribute, else the first child's text.
    fn raw(&self, key: &str) -> Option<&str> {
        lookup(&self.attributes, key).or_else(|| lookup(&self.fields, key))
    }
}

/// Text captured for one field element.
#[derive(Debug)]
struct Capture {
    field: String,
    depth: usize,
    text: String,
}

/// State of the single-pass parse.
#[derive(Debug)]
struct StreamState<'c, E> {
    criteria: Option<&'c SearchCriteria>,
    current_entity: Option<Open<E>>,
    current_author: Option<Open<Author>>,
    current_element: Option<Capture>,
    depth: usize,
    root_seen: bool,
    results: Vec<E>,
}

impl<'c, E: StreamRecord> StreamState<'c, E> {
    fn new(criteria: Option<&'c SearchCriteria>) -> Self {
        StreamState {
            criteria,
            current_entity: None,
            current_author: None,
            current_element: None,
            depth: 0,
            root_seen: false,
            results: Vec::new(),
        }
    }

    fn on_start(&mut self, name: &str, attributes: Vec<(String, String)>) -> Result<()> {
        self.depth += 1;
        let depth = self.depth;

        if depth == 1 {
            if self.root_seen {
                return Err(CatalogError::MalformedInput(format!(
                    "second root element <{name}>"
                )));
            }
            self.root_seen = true;
        }

        if self.current_element.is_some() {
            // Markup inside a field element; its text is still captured.
            return Ok(());
        }

        let Some(entity) = self.current_entity.as_ref() else {
            if name == E::TAG {
                let value = E::from_attributes(&attributes);
                self.current_entity = Some(Open::new(value, depth, attributes));
            }
            return Ok(());
        };

        let parent_depth = self.current_author.as_ref().map_or(entity.depth, |a| a.depth);
        if depth != parent_depth + 1 {
            return Ok(());
        }

        if E::HAS_AUTHORS && self.current_author.is_none() && name == AUTHOR_TAG {
            self.current_author = Some(Open::new(Author::default(), depth, attributes));
        } else {
            self.current_element = Some(Capture {
                field: name.to_string(),
                depth,
                text: String::new(),
            });
        }
        Ok(())
    }

    fn on_text(&mut self, text: &str) -> Result<()> {
        if let Some(author) = self.current_author.as_mut() {
            author.text.push_str(text);
        }
        if let Some(capture) = self.current_element.as_mut() {
            capture.text.push_str(text);
        } else if self.depth == 0 && !text.trim().is_empty() {
            return Err(CatalogError::MalformedInput(
                "text outside the root element".to_string(),
            ));
        }
        Ok(())
    }

    fn on_end(&mut self) {
        let depth = self.depth;
        self.depth = self.depth.saturating_sub(1);

        if self.current_element.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = self.current_element.take() {
                self.store(capture);
            }
        } else if self.current_author.as_ref().is_some_and(|a| a.depth == depth) {
            if let (Some(author), Some(entity)) =
                (self.current_author.take(), self.current_entity.as_mut())
            {
                entity.claim(AUTHOR_TAG, &author.text);
                entity.value.push_author(author.value);
            }
        } else if self.current_entity.as_ref().is_some_and(|e| e.depth == depth) {
            if let Some(entity) = self.current_entity.take() {
                self.complete(entity);
            }
        }
    }

    fn store(&mut self, capture: Capture) {
        if let Some(author) = self.current_author.as_mut() {
            if author.claim(&capture.field, &capture.text) {
                assign_author(&mut author.value, &capture.field, capture.text);
            }
        } else if let Some(entity) = self.current_entity.as_mut() {
            if entity.claim(&capture.field, &capture.text) {
                entity.value.assign(&capture.field, capture.text);
            }
        }
    }

    fn complete(&mut self, entity: Open<E>) {
        if accepts(self.criteria, |key| entity.raw(key).map(Cow::Borrowed)) {
            self.results.push(entity.value);
        } else {
            trace!(entity = E::TAG, "entity rejected by criteria");
        }
    }

    fn finish(self) -> Result<Vec<E>> {
        if self.depth > 0 {
            if let Some(open) = &self.current_entity {
                warn!(entity = E::TAG, record = ?open.value, "discarding entity left open at end of input");
            }
            return Err(CatalogError::MalformedInput(format!(
                "unexpected end of document with {} unclosed element(s)",
                self.depth
            )));
        }
        if !self.root_seen {
            return Err(CatalogError::MalformedInput(
                "document has no root element".to_string(),
            ));
        }
        Ok(self.results)
    }
}
