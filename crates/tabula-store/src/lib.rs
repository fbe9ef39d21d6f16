//! # tabula-store
//!
//! Persistence for the tabula shared database.
//!
//! The [`Store`] trait is the boundary between the core and wherever rows,
//! columns and cells live. Two implementations are provided:
//! - [`MemoryStore`] - process-local, for tests and scratch tables
//! - [`SqliteStore`] - a SQLite file with cascading deletes
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{ColumnType, NewColumn, StorageForm};
//! use tabula_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let column = store
//!     .create_column(NewColumn {
//!         name: "Item".into(),
//!         column_type: ColumnType::Text,
//!         order_index: 0,
//!         settings: None,
//!     })
//!     .unwrap();
//! let row = store.create_row(0).unwrap();
//! store
//!     .upsert_cell(&row.id, &column.id, StorageForm::serialized("\"Hello\""))
//!     .unwrap();
//! assert_eq!(store.get_row(&row.id).unwrap().cell_count(), 1);
//! ```

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::{SqliteOptions, SqliteStore};
pub use store::Store;
