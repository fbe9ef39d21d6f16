//! Row types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::{CellValue, StorageForm};
use crate::codec;
use crate::column::{Column, ColumnId, ColumnType};

/// Opaque row identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Wrap an identifier string
    pub fn new<S: Into<String>>(id: S) -> Self {
        RowId(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId::new(s)
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId(s)
    }
}

/// Row metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: RowId,
    /// Sort key; not guaranteed unique
    pub order_index: i64,
    /// Store-assigned creation sequence, used to break order ties
    pub created_seq: u64,
}

/// A row together with all of its stored cells
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedRow {
    pub row: Row,
    /// Stored cells keyed by column; absent columns have no cell
    pub cells: BTreeMap<ColumnId, StorageForm>,
}

impl MaterializedRow {
    /// Create a row with no cells
    pub fn new(row: Row) -> Self {
        Self {
            row,
            cells: BTreeMap::new(),
        }
    }

    /// Row identifier
    pub fn id(&self) -> &RowId {
        &self.row.id
    }

    /// Stored form for a column, if a cell exists
    pub fn cell(&self, column: &ColumnId) -> Option<&StorageForm> {
        self.cells.get(column)
    }

    /// Add or replace a cell
    pub fn with_cell(mut self, column: ColumnId, stored: StorageForm) -> Self {
        self.cells.insert(column, stored);
        self
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Decode every cell using its column's type
    ///
    /// Cells whose column is not in `columns` are decoded as text.
    pub fn decode(&self, columns: &[Column]) -> DecodedRow {
        let values = self
            .cells
            .iter()
            .filter_map(|(column_id, stored)| {
                let column_type = columns
                    .iter()
                    .find(|c| &c.id == column_id)
                    .map(|c| c.column_type)
                    .unwrap_or(ColumnType::Text);
                codec::decode(stored, column_type).map(|v| (column_id.clone(), v))
            })
            .collect();
        DecodedRow {
            row: self.row.clone(),
            values,
        }
    }
}

/// A row with its cells decoded into typed values
///
/// Cells that are absent, stored empty or malformed have no entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    pub row: Row,
    pub values: BTreeMap<ColumnId, CellValue>,
}

impl DecodedRow {
    /// Row identifier
    pub fn id(&self) -> &RowId {
        &self.row.id
    }

    /// Decoded value for a column
    pub fn value(&self, column: &ColumnId) -> Option<&CellValue> {
        self.values.get(column)
    }

    /// Iterate over all non-empty values
    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.values.values()
    }
}
