//! Configuration options for catalog parsing.
//!
//! This module provides the [`ParserConfig`] struct, which selects the parsing
//! strategy and an optional [`CancellationToken`], and builds a
//! [`ParserContext`] from them.

use crate::context::ParserContext;
use crate::strategies::StrategyKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a caller and a running parse.
///
/// Cloning the token shares the same flag. The incremental strategy checks it
/// between token events; the tree and query strategies check it between
/// entities.
///
/// # Examples
///
/// ```
/// use catalog_xml::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every parse holding this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Configuration for building a [`ParserContext`].
///
/// # Examples
///
/// ```
/// use catalog_xml::{ParserConfig, StrategyKind};
///
/// // Default configuration (query strategy, no cancellation)
/// let context = ParserConfig::default().build_context();
/// assert_eq!(context.current_strategy().kind(), StrategyKind::Query);
///
/// let context = ParserConfig::default()
///     .with_strategy(StrategyKind::Incremental)
///     .build_context();
/// assert_eq!(context.current_strategy().kind(), StrategyKind::Incremental);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Strategy the context starts with.
    pub strategy: StrategyKind,

    /// Token checked while parsing; `None` means the parse cannot be cancelled.
    pub cancellation: Option<CancellationToken>,
}

impl ParserConfig {
    /// Create a configuration with the default strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build a context holding the configured strategy.
    #[must_use]
    pub fn build_context(&self) -> ParserContext {
        ParserContext::new(self.strategy.create(self.cancellation.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_builder() {
        let config = ParserConfig::new()
            .with_strategy(StrategyKind::Tree)
            .with_cancellation(CancellationToken::new());
        assert_eq!(config.strategy, StrategyKind::Tree);
        assert!(config.cancellation.is_some());
        assert_eq!(
            config.build_context().current_strategy().kind(),
            StrategyKind::Tree
        );
    }
}
