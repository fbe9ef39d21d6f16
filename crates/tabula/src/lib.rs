//! # tabula
//!
//! A shared, schema-flexible table.
//!
//! Users define typed columns (text, number, select, multi-select, date,
//! checkbox, url), add rows and edit cells; reads decode every stored value
//! against its column's current type and can be narrowed by free-text search
//! and a structured filter.
//!
//! ## Features
//!
//! - Input is parsed and validated per column type; rejected input is never written
//! - Tolerant decoding: malformed or out-of-date stored values read as empty
//! - Display formatting with colored option chips, checkbox glyphs and truncated links
//! - Row duplication and bulk reordering
//! - In-memory and SQLite stores behind one [`Store`] trait
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let db = Database::new(MemoryStore::new());
//! let tags = db.create_column("Tags", ColumnType::MultiSelect).unwrap();
//! let row = db.create_row().unwrap();
//! db.edit_cell(&row.id, &tags.id, "Ops, Tech").unwrap();
//!
//! let view = db.table(&RowQuery::new().with_search("tech")).unwrap();
//! assert_eq!(view.rows.len(), 1);
//! assert_eq!(view.rows[0].display[0].to_string(), "[Ops] [Tech]");
//! ```

pub mod database;
pub mod prelude;
pub mod seed;
pub mod view;

pub use database::{Database, DatabaseOptions};
pub use view::{RowView, TableView};

// Re-export core types
pub use tabula_core::{
    codec, edit, edit_text, format, normalize_input, ordering, registry, CellValue, Chip, Column,
    ColumnId, ColumnPatch, ColumnSettings, ColumnType, DecodedRow, DisplayValue, Error, Filter,
    FilterOperator, FormatOptions, MaterializedRow, OptionColor, Result, Row, RowId, RowQuery,
    SelectOption, StorageForm,
};

// Re-export stores
pub use tabula_store::{MemoryStore, SqliteOptions, SqliteStore, Store, StoreError};
