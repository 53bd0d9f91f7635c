//! Strategy holder with runtime replacement.
//!
//! A [`ParserContext`] owns exactly one strategy at a time and forwards every
//! parse call to it. Replacing the strategy takes `&mut self`, so a context
//! shared behind a lock or handed to one owner can never have a parse and a
//! replacement in flight at once.

use crate::criteria::SearchCriteria;
use crate::error::Result;
use crate::record::{Book, LoanRecord, Reader};
use crate::strategies::XmlStrategy;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Holds the current parsing strategy.
///
/// # Examples
///
/// ```
/// use catalog_xml::{ParserContext, StrategyKind};
///
/// let mut context = ParserContext::new(StrategyKind::Tree.create(None));
/// assert_eq!(context.current_strategy().kind(), StrategyKind::Tree);
///
/// context.set_strategy(StrategyKind::Incremental.create(None));
/// assert_eq!(context.current_strategy().kind(), StrategyKind::Incremental);
/// ```
pub struct ParserContext {
    strategy: Box<dyn XmlStrategy>,
}

impl ParserContext {
    /// Create a context around `strategy`.
    #[must_use]
    pub fn new(strategy: Box<dyn XmlStrategy>) -> Self {
        ParserContext { strategy }
    }

    /// Replace the current strategy. Later parse calls use `strategy`.
    pub fn set_strategy(&mut self, strategy: Box<dyn XmlStrategy>) {
        debug!(
            from = self.strategy.name(),
            to = strategy.name(),
            "switching parsing strategy"
        );
        self.strategy = strategy;
    }

    /// The strategy parse calls are forwarded to.
    #[must_use]
    pub fn current_strategy(&self) -> &dyn XmlStrategy {
        self.strategy.as_ref()
    }

    /// Forward to [`XmlStrategy::parse_books`].
    ///
    /// # Errors
    ///
    /// Whatever the current strategy returns.
    pub fn parse_books(&self, path: &Path, criteria: Option<&SearchCriteria>) -> Result<Vec<Book>> {
        self.strategy.parse_books(path, criteria)
    }

    /// Forward to [`XmlStrategy::parse_readers`].
    ///
    /// # Errors
    ///
    /// Whatever the current strategy returns.
    pub fn parse_readers(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<Reader>> {
        self.strategy.parse_readers(path, criteria)
    }

    /// Forward to [`XmlStrategy::parse_loan_records`].
    ///
    /// # Errors
    ///
    /// Whatever the current strategy returns.
    pub fn parse_loan_records(
        &self,
        path: &Path,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<LoanRecord>> {
        self.strategy.parse_loan_records(path, criteria)
    }
}

impl Default for ParserContext {
    fn default() -> Self {
        ParserContext::new(crate::strategies::StrategyKind::default().create(None))
    }
}

impl fmt::Debug for ParserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserContext")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::StrategyKind;

    #[test]
    fn test_default_context_uses_query() {
        let context = ParserContext::default();
        assert_eq!(context.current_strategy().kind(), StrategyKind::Query);
        assert!(format!("{context:?}").contains("Query"));
    }

    #[test]
    fn test_set_strategy_replaces() {
        let mut context = ParserContext::default();
        for kind in StrategyKind::ALL {
            context.set_strategy(kind.create(None));
            assert_eq!(context.current_strategy().kind(), kind);
        }
    }

    #[test]
    fn test_forwarding_reports_missing_file() {
        let context = ParserContext::default();
        let result = context.parse_books(Path::new("/nonexistent/library.xml"), None);
        assert!(matches!(
            result,
            Err(crate::error::CatalogError::NotFound { .. })
        ));
    }
}
