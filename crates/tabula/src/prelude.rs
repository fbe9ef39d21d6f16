//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellValue,
    // Column types
    Column,
    ColumnId,
    ColumnPatch,
    ColumnType,
    // Main types
    Database,
    DatabaseOptions,
    DisplayValue,
    // Error types
    Error,
    // Search and filter
    Filter,
    FilterOperator,
    FormatOptions,
    // Stores
    MemoryStore,
    OptionColor,
    Result,
    Row,
    RowId,
    RowQuery,
    SelectOption,
    SqliteStore,
    Store,
    // Views
    TableView,
};
