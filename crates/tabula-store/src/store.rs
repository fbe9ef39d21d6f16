//! The store trait

use rayon::prelude::*;
use tabula_core::{
    next_order_index, ColumnId, Column, ColumnPatch, MaterializedRow, NewColumn, Row, RowId,
    StorageForm,
};

use crate::error::Result;

/// Entity kind names used in "not found" errors
pub mod kind {
    pub const COLUMN: &str = "Column";
    pub const ROW: &str = "Row";
    pub const CELL: &str = "Cell";
}

/// Persistence boundary for columns, rows and cells
///
/// Implementations hold no business logic: values arrive already validated
/// and encoded. Cells are keyed by `(row, column)` and every cell write is an
/// upsert, so at most one cell exists per pair. Deleting a row or a column
/// removes its cells.
///
/// Listings are returned in display order (ascending `order_index`, ties
/// broken by creation sequence).
pub trait Store: Send + Sync {
    /// All columns in display order
    fn get_columns(&self) -> Result<Vec<Column>>;

    /// A single column
    fn get_column(&self, id: &ColumnId) -> Result<Column>;

    /// Insert a column with a fresh id
    fn create_column(&self, column: NewColumn) -> Result<Column>;

    /// Apply a partial update and return the updated column
    fn update_column(&self, id: &ColumnId, patch: &ColumnPatch) -> Result<Column>;

    /// Delete a column and all of its cells
    fn delete_column(&self, id: &ColumnId) -> Result<()>;

    /// All rows with their cells, in display order
    fn get_rows(&self) -> Result<Vec<MaterializedRow>>;

    /// A single row with its cells
    fn get_row(&self, id: &RowId) -> Result<MaterializedRow>;

    /// Insert an empty row with a fresh id
    fn create_row(&self, order_index: i64) -> Result<Row>;

    /// Delete a row and all of its cells
    fn delete_row(&self, id: &RowId) -> Result<()>;

    /// Move a row to a new sort position
    fn set_row_order(&self, id: &RowId, order_index: i64) -> Result<()>;

    /// Stored form of a cell, `None` if no cell exists for the pair
    fn get_cell(&self, row: &RowId, column: &ColumnId) -> Result<Option<StorageForm>>;

    /// Insert or replace the cell for `(row, column)`
    fn upsert_cell(&self, row: &RowId, column: &ColumnId, stored: StorageForm) -> Result<()>;

    /// Write several cells of one row
    ///
    /// The default issues one upsert per cell in parallel; the writes may
    /// land in any order and the first failure is returned.
    fn insert_cells(&self, row: &RowId, cells: Vec<(ColumnId, StorageForm)>) -> Result<()> {
        cells
            .into_par_iter()
            .try_for_each(|(column, stored)| self.upsert_cell(row, &column, stored))
    }

    /// Copy a row and its cells to a new row at the end of the order
    ///
    /// The copy shares nothing with the source; later edits to either row
    /// leave the other alone.
    fn duplicate_row(&self, id: &RowId) -> Result<Row> {
        let source = self.get_row(id)?;
        let order_index = next_order_index(self.get_rows()?.iter().map(|r| r.row.order_index));
        let row = self.create_row(order_index)?;
        self.insert_cells(&row.id, source.cells.into_iter().collect())?;
        log::debug!("Duplicated row {} as {}", id, row.id);
        Ok(row)
    }
}
