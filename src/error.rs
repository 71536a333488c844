//! Error types for BasedDB
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using BasedError
pub type Result<T> = std::result::Result<T, BasedError>;

/// Unified error type for BasedDB operations
#[derive(Debug, Error)]
pub enum BasedError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error at {}: {source}", path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("Index '{index}' is not declared on table '{table}'")]
    IndexNotFound { table: String, index: String },

    // -------------------------------------------------------------------------
    // Content Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Invariant violated: {0}")]
    InvariantViolated(String),

    #[error("Invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },

    #[error("Invalid value '{key}' for index '{index}': keys may not contain ':' or line breaks")]
    InvalidIndexKey { index: String, key: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BasedError {
    /// Wrap an I/O error with the path it happened on.
    ///
    /// `ErrorKind::NotFound` becomes [`BasedError::NotFound`] so callers can
    /// match on a missing table or document without inspecting io errors.
    pub(crate) fn io(what: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            BasedError::NotFound { what, path }
        } else {
            BasedError::IoAt { path, source }
        }
    }

    /// True for the `NotFound` family (missing table, document or index file)
    pub fn is_not_found(&self) -> bool {
        matches!(self, BasedError::NotFound { .. })
    }

    /// True when on-disk content failed to parse
    pub fn is_corrupt(&self) -> bool {
        matches!(self, BasedError::Corrupt { .. })
    }
}
