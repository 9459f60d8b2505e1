//! Error types for the Bantam library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`BantamError`] enum. Callers that need to branch on failure class match
//! on the variant; everything else bubbles the error up with `?`.
//!
//! # Examples
//!
//! ```
//! use bantam::error::{BantamError, Result};
//!
//! fn parse_page(from: i64) -> Result<u64> {
//!     if from < 0 {
//!         return Err(BantamError::invalid_argument("from must be non-negative"));
//!     }
//!     Ok(from as u64)
//! }
//!
//! assert!(parse_page(-1).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Bantam operations.
#[derive(Error, Debug)]
pub enum BantamError {
    /// I/O errors from the filesystem backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A request that is malformed before parsing even starts, such as an
    /// empty query string.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A query string that fails to parse.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// A lookup for a document id that is not in the index.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A batch exceeding the configured operation limit.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A search abandoned because its deadline passed.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// A failure inside the analysis pipeline.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A failure in a storage backend.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Index-related errors, including corrupt segment files.
    #[error("Index error: {0}")]
    Index(String),

    /// Invariant violations that indicate a bug rather than bad input.
    #[error("Internal error: {0}")]
    Internal(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`BantamError`].
pub type Result<T> = std::result::Result<T, BantamError>;

impl BantamError {
    /// A [`BantamError::InvalidArgument`] with the given message.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        BantamError::InvalidArgument(msg.into())
    }

    /// A [`BantamError::Syntax`] with the given message.
    pub fn syntax<S: Into<String>>(msg: S) -> Self {
        BantamError::Syntax(msg.into())
    }

    /// A [`BantamError::NotFound`] with the given message.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        BantamError::NotFound(msg.into())
    }

    /// A [`BantamError::ResourceExhausted`] with the given message.
    pub fn resource_exhausted<S: Into<String>>(msg: S) -> Self {
        BantamError::ResourceExhausted(msg.into())
    }

    /// A [`BantamError::Cancelled`] with the given message.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        BantamError::Cancelled(msg.into())
    }

    /// A [`BantamError::Analysis`] with the given message.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        BantamError::Analysis(msg.into())
    }

    /// A [`BantamError::Storage`] with the given message.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        BantamError::Storage(msg.into())
    }

    /// A [`BantamError::Index`] with the given message.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        BantamError::Index(msg.into())
    }

    /// A [`BantamError::Internal`] with the given message.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        BantamError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BantamError::invalid_argument("query must not be empty");
        assert_eq!(err.to_string(), "Invalid argument: query must not be empty");

        let err = BantamError::syntax("unbalanced parentheses");
        assert_eq!(err.to_string(), "Syntax error: unbalanced parentheses");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing file");
        let err: BantamError = io_err.into();
        assert!(matches!(err, BantamError::Io(_)));
    }

    #[test]
    fn test_constructors_pick_the_matching_variant() {
        assert!(matches!(
            BantamError::not_found("x"),
            BantamError::NotFound(_)
        ));
        assert!(matches!(
            BantamError::resource_exhausted("x"),
            BantamError::ResourceExhausted(_)
        ));
        assert!(matches!(
            BantamError::cancelled("x"),
            BantamError::Cancelled(_)
        ));
    }
}
