//! Storage representation of cell values
//!
//! A cell's content is held by the store as a type-erased serialized string
//! (JSON text) or an explicit absence marker. [`StorageForm`] is that
//! representation; conversion to and from [`CellValue`](super::CellValue)
//! lives in [`crate::codec`].

/// Serialized, type-erased cell content as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum StorageForm {
    /// Explicit empty marker (stored as SQL `NULL` / absent)
    #[default]
    Empty,
    /// Serialized value
    Serialized(String),
}

impl StorageForm {
    /// Wrap serialized text
    pub fn serialized<S: Into<String>>(text: S) -> Self {
        StorageForm::Serialized(text.into())
    }

    /// Build from a nullable store column
    pub fn from_option(text: Option<String>) -> Self {
        match text {
            Some(text) => StorageForm::Serialized(text),
            None => StorageForm::Empty,
        }
    }

    /// Serialized text, if any
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            StorageForm::Empty => None,
            StorageForm::Serialized(text) => Some(text),
        }
    }

    /// Convert into a nullable store column
    pub fn into_option(self) -> Option<String> {
        match self {
            StorageForm::Empty => None,
            StorageForm::Serialized(text) => Some(text),
        }
    }

    /// Check for the empty marker
    pub fn is_empty(&self) -> bool {
        matches!(self, StorageForm::Empty)
    }
}
