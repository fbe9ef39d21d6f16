//! Error types for tabula-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tabula-core and the layers built on it
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A referenced row, column or cell does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Parsed value fails the column type's contract; the write is rejected
    #[error("Invalid value for {column_type} column")]
    ValidationFailed { column_type: &'static str },

    /// Stored content could not be decoded
    ///
    /// The codec recovers from this locally (the cell reads as empty); the
    /// variant exists for callers that decode strictly, such as settings edits.
    #[error("Malformed stored value: {0}")]
    MalformedStorage(String),

    /// Column type tag outside the fixed set
    #[error("Unknown column type: {0}")]
    UnknownColumnType(String),

    /// Column name empty or too long
    #[error("Invalid column name: {0:?}")]
    InvalidColumnName(String),

    /// Failure reported by the store adapter
    #[error("Store operation failed: {0}")]
    Store(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "not found" error for an entity kind
    pub fn not_found<S: Into<String>>(kind: &'static str, id: S) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
