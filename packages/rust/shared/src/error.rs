//! Error types for PolicyDiff.
//!
//! Library crates use [`PolicyDiffError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all PolicyDiff operations.
#[derive(Debug, thiserror::Error)]
pub enum PolicyDiffError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Completion service error (HTTP failure, bad status, or response parsing).
    #[error("completion error: {0}")]
    Completion(String),

    /// Document parsing error (malformed DOCX input).
    #[error("document error: {message}")]
    Document { message: String },

    /// Document serialization error.
    #[error("serialize error: {0}")]
    Serialize(String),

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Authentication error (hashing failure, not a failed login).
    #[error("auth error: {0}")]
    Auth(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad argument, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PolicyDiffError>;

impl PolicyDiffError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a document error from any displayable message.
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
