#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # catalog-xml: library catalogue extraction
//!
//! Extracts books, readers and loan records from library catalogue XML
//! documents with three interchangeable parsing strategies that produce
//! identical results.
//!
//! ## Quick Start
//!
//! ```no_run
//! use catalog_xml::{ParserConfig, SearchCriteria, StrategyKind};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut context = ParserConfig::default().build_context();
//! let criteria = SearchCriteria::new().with_filter("Title", "dune");
//!
//! for book in context.parse_books(Path::new("library.xml"), Some(&criteria))? {
//!     println!("{book}");
//! }
//!
//! // Swap the algorithm at runtime; the results stay the same.
//! context.set_strategy(StrategyKind::Incremental.create(None));
//! let loans = context.parse_loan_records(Path::new("library.xml"), None)?;
//! println!("{} loans", loans.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`record`]: Extracted record types (`Book`, `Author`, `Reader`, `LoanRecord`)
//! - [`criteria`]: Field filters applied while parsing
//! - [`strategies`]: The `XmlStrategy` contract and its three implementations
//! - [`context`]: Strategy holder with runtime replacement
//! - [`config`]: Context configuration and cancellation
//! - [`document`]: Owned document object model
//! - [`inspect`]: Tag, attribute and element inspection of any document
//! - [`fields`]: Field-name lookup tables for records
//! - [`error`]: Error types and result type

pub mod config;
pub mod context;
pub mod criteria;
pub mod document;
pub mod error;
pub mod fields;
pub mod inspect;
pub mod record;
pub mod source;
pub mod strategies;
pub mod values;

pub use config::{CancellationToken, ParserConfig};
pub use context::ParserContext;
pub use criteria::SearchCriteria;
pub use error::{CatalogError, Result};
pub use fields::FieldAccess;
pub use record::{Author, Book, LoanRecord, Reader};
pub use strategies::{StrategyKind, XmlStrategy};
