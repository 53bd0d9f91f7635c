//! Error types for catalog parsing operations.
//!
//! This module provides the [`CatalogError`] type shared by every parsing
//! strategy and the [`Result`] convenience type.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for all catalog parsing operations.
///
/// Every strategy surfaces the same variants for the same failure, so callers
/// can swap strategies without changing their error handling.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The input path does not exist or cannot be opened for reading.
    #[error("Input not found: {}: {source}", .path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying open/read failure.
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML (syntax error, unbalanced tags,
    /// invalid encoding, or elements left open at end of input).
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The parse was interrupted through a cancellation token.
    #[error("Parse cancelled")]
    Cancelled,

    /// IO error from the underlying source after it was opened.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CatalogError {
    /// Build a [`CatalogError::NotFound`] for `path`.
    pub(crate) fn not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::NotFound {
            path: path.into(),
            source,
        }
    }
}

impl From<roxmltree::Error> for CatalogError {
    fn from(err: roxmltree::Error) -> Self {
        CatalogError::MalformedInput(err.to_string())
    }
}

impl From<quick_xml::Error> for CatalogError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => CatalogError::IoError(std::io::Error::new(
                io.kind(),
                io.to_string(),
            )),
            other => CatalogError::MalformedInput(other.to_string()),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for CatalogError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        CatalogError::MalformedInput(err.to_string())
    }
}

/// Convenience type alias for [`std::result::Result`] with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_includes_path() {
        let err = CatalogError::not_found(
            "missing/library.xml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let message = err.to_string();
        assert!(message.contains("missing/library.xml"));
        assert!(message.contains("no such file"));
    }

    #[test]
    fn test_roxmltree_error_is_malformed() {
        let err: CatalogError = roxmltree::Document::parse("<a><b></a>").unwrap_err().into();
        assert!(matches!(err, CatalogError::MalformedInput(_)));
    }
}
