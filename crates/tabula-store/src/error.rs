//! Error types for tabula-store

use thiserror::Error;

/// Result type alias using [`StoreError`]
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors reported by a store
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced row, column or cell does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Persisted metadata that cannot be read back
    #[error("Corrupt store data: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Create a "not found" error for an entity kind
    pub fn not_found<S: Into<String>>(kind: &'static str, id: S) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<StoreError> for tabula_core::Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => tabula_core::Error::NotFound { kind, id },
            other => tabula_core::Error::Store(other.to_string()),
        }
    }
}
