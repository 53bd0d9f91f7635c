//! Interchangeable parsing strategies.
//!
//! Three independent algorithms extract the same records from the same
//! document:
//!
//! | Strategy | Module | Traversal |
//! |----------|--------|-----------|
//! | Tree | [`tree`] | Loads a navigable node tree and selects nodes by path |
//! | Query | [`query`] | Loads an owned object model and selects with iterator combinators |
//! | Incremental | [`incremental`] | Single forward pass over the token stream |
//!
//! For a well-formed document and equal criteria all three return the same
//! records, with the same field values, in document order.
//!
//! # Example
//!
//! ```no_run
//! use catalog_xml::strategies::{StrategyKind, XmlStrategy};
//! use catalog_xml::SearchCriteria;
//! use std::path::Path;
//!
//! let criteria = SearchCriteria::new().with_filter("Category", "fic");
//! for kind in StrategyKind::ALL {
//!     let strategy = kind.create(None);
//!     let books = strategy.parse_books(Path::new("library.xml"), Some(&criteria))?;
//!     println!("{}: {} books", strategy.name(), books.len());
//! }
//! # Ok::<(), catalog_xml::CatalogError>(())
//! ```

pub mod incremental;
pub mod query;
pub mod tree;

pub use incremental::IncrementalStrategy;
pub use query::QueryStrategy;
pub use tree::TreeStrategy;

use crate::config::CancellationToken;
use crate::criteria::SearchCriteria;
use crate::error::{CatalogError, Result};
use crate::record::{Book, LoanRecord, Reader};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Element name of a book entity.
pub const BOOK_TAG: &str = "Book";
/// Element name of an author inside a book.
pub const AUTHOR_TAG: &str = "Author";
/// Element name of a reader entity.
pub const READER_TAG: &str = "Reader";
/// Element name of a loan entity.
pub const BORROW_TAG: &str = "Borrow";

/// Common contract of every parsing strategy.
///
/// Strategies hold no state between calls; each call opens the document,
/// walks it once and returns freshly built records.
pub trait XmlStrategy: fmt::Debug + Send + Sync {
    /// Fixed human-readable label of the algorithm, for diagnostics.
    fn name(&self) -> &'static str;

    /// Which algorithm this is.
    fn kind(&self) -> StrategyKind;

    /// Extract every `<Book>` matching `criteria`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if `path` cannot be opened,
    /// [`CatalogError::MalformedInput`] if the document is not well-formed and
    /// [`CatalogError::Cancelled`] if the parse was cancelled.
    fn parse_books(&self, path: &Path, criteria: Option<&SearchCriteria>) -> Result<Vec<Book>>;

    /// Extract every `<Reader>` matching `criteria`, in document order.
    ///
    /// # Errors
    ///
    /// Same as [`parse_books`](Self::parse_books).
    fn parse_readers(&self, path: &Path, criteria: Option<&SearchCriteria>)
        -> Result<Vec<Reader>>;

    /// Extract every `<Borrow>` matching `criteria`, in document order.
    ///
    /// # Errors
    ///
    /// Same as [`parse_books`](Self::parse_books).
    fn parse_loan_records(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<LoanRecord>>;
}

/// The available algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    /// Navigable node tree with path selection
    Tree,
    /// Owned object model with functional selection
    #[default]
    Query,
    /// Single-pass token stream state machine
    Incremental,
}

impl StrategyKind {
    /// Every strategy, in a stable order.
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Tree,
        StrategyKind::Query,
        StrategyKind::Incremental,
    ];

    /// Instantiate the strategy, optionally bound to a cancellation token.
    #[must_use]
    pub fn create(self, cancellation: Option<CancellationToken>) -> Box<dyn XmlStrategy> {
        match self {
            StrategyKind::Tree => Box::new(TreeStrategy::new().with_cancellation(cancellation)),
            StrategyKind::Query => Box::new(QueryStrategy::new().with_cancellation(cancellation)),
            StrategyKind::Incremental => {
                Box::new(IncrementalStrategy::new().with_cancellation(cancellation))
            },
        }
    }

    /// Short identifier accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Tree => "tree",
            StrategyKind::Query => "query",
            StrategyKind::Incremental => "incremental",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" | "dom" => Ok(StrategyKind::Tree),
            "query" | "linq" => Ok(StrategyKind::Query),
            "incremental" | "sax" | "stream" => Ok(StrategyKind::Incremental),
            other => Err(format!(
                "unknown strategy '{other}' (expected tree, query or incremental)"
            )),
        }
    }
}

/// Fail with [`CatalogError::Cancelled`] once the token has been triggered.
pub(crate) fn check_cancelled(token: Option<&CancellationToken>) -> Result<()> {
    match token {
        Some(token) if token.is_cancelled() => Err(CatalogError::Cancelled),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str_aliases() {
        assert_eq!("DOM".parse::<StrategyKind>(), Ok(StrategyKind::Tree));
        assert_eq!("linq".parse::<StrategyKind>(), Ok(StrategyKind::Query));
        assert_eq!(" sax ".parse::<StrategyKind>(), Ok(StrategyKind::Incremental));
        assert!("xpath".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_created_strategy_reports_kind() {
        for kind in StrategyKind::ALL {
            let strategy = kind.create(None);
            assert_eq!(strategy.kind(), kind);
            assert!(!strategy.name().is_empty());
            assert_eq!(kind.as_str().parse::<StrategyKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_check_cancelled() {
        let token = CancellationToken::new();
        assert!(check_cancelled(Some(&token)).is_ok());
        token.cancel();
        assert!(matches!(
            check_cancelled(Some(&token)),
            Err(CatalogError::Cancelled)
        ));
        assert!(check_cancelled(None).is_ok());
    }
}
