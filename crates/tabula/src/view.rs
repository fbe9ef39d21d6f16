//! Read-side view of a table

use tabula_core::{CellValue, Column, ColumnId, DisplayValue, FormatOptions, Row, RowId};

/// One row as shown to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub row: Row,
    /// Decoded values, one slot per column in column order
    pub values: Vec<Option<CellValue>>,
    /// Formatted values, one per column in column order
    pub display: Vec<DisplayValue>,
}

impl RowView {
    /// Row identifier
    pub fn id(&self) -> &RowId {
        &self.row.id
    }

    /// Render every cell as plain text
    pub fn render(&self, options: &FormatOptions) -> Vec<String> {
        self.display.iter().map(|d| d.render(options)).collect()
    }
}

/// Columns and the rows that passed the current search and filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<RowView>,
}

impl TableView {
    /// Position of a column in the view
    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    /// Decoded value at (row position, column)
    pub fn value(&self, row: usize, column: &ColumnId) -> Option<&CellValue> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.values.get(index)?.as_ref()
    }

    /// Check whether no rows passed
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
