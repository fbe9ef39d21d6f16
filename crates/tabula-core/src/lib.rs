//! # tabula-core
//!
//! Core data structures for the tabula shared database.
//!
//! This crate provides the typed cell value subsystem:
//! - [`ColumnType`] and the [`registry`] - parse and validate raw input per type
//! - [`CellValue`] and [`StorageForm`] - typed values and their stored form, converted by [`codec`]
//! - [`DisplayValue`] - read-path rendering via [`format()`](format::format)
//! - [`RowQuery`] and [`Filter`] - free-text search and structured filters
//! - [`ordering`] - display order of rows and columns
//!
//! No I/O happens here; stores live in `tabula-store`.
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{codec, registry, CellValue, ColumnType, StorageForm};
//!
//! let value = registry::check(ColumnType::MultiSelect, r#"["Ops","Tech"]"#).unwrap();
//! let stored = codec::encode(value.as_ref());
//! assert_eq!(stored, StorageForm::serialized(r#"["Ops","Tech"]"#));
//!
//! let decoded = codec::decode(&stored, ColumnType::MultiSelect);
//! assert_eq!(decoded, Some(CellValue::list(["Ops", "Tech"])));
//!
//! // Malformed content reads as empty
//! assert_eq!(codec::decode(&StorageForm::serialized("{"), ColumnType::Text), None);
//! ```

pub mod cell;
pub mod codec;
pub mod column;
pub mod edit;
pub mod error;
pub mod filter;
pub mod format;
pub mod ordering;
pub mod registry;
pub mod row;

// Re-exports for convenience
pub use cell::{CellValue, StorageForm};
pub use column::{
    validate_column_name, Column, ColumnId, ColumnPatch, ColumnSettings, ColumnType, NewColumn,
    OptionColor, SelectOption, MAX_COLUMN_NAME_LEN,
};
pub use edit::{edit_text, normalize_input};
pub use error::{Error, Result};
pub use filter::{matches_search, Filter, FilterOperator, RowQuery};
pub use format::{Chip, DisplayValue, FormatOptions};
pub use ordering::{next_order_index, reorder_assignments, sort_for_display, Ordered};
pub use registry::TypeDef;
pub use row::{DecodedRow, MaterializedRow, Row, RowId};
