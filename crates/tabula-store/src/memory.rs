//! In-memory store

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use tabula_core::{
    sort_for_display, Column, ColumnId, ColumnPatch, MaterializedRow, NewColumn, Row, RowId,
    StorageForm,
};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{kind, Store};

#[derive(Debug, Default)]
struct Tables {
    columns: HashMap<ColumnId, Column>,
    rows: HashMap<RowId, Row>,
    cells: HashMap<RowId, BTreeMap<ColumnId, StorageForm>>,
    next_seq: u64,
}

impl Tables {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn materialize(&self, row: &Row) -> MaterializedRow {
        MaterializedRow {
            row: row.clone(),
            cells: self.cells.get(&row.id).cloned().unwrap_or_default(),
        }
    }
}

/// Store that keeps everything in process memory
///
/// Used by tests and by callers that want a scratch table; nothing is
/// persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get_columns(&self) -> Result<Vec<Column>> {
        let mut columns: Vec<Column> = self.tables.read().columns.values().cloned().collect();
        sort_for_display(&mut columns);
        Ok(columns)
    }

    fn get_column(&self, id: &ColumnId) -> Result<Column> {
        self.tables
            .read()
            .columns
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(kind::COLUMN, id.as_str()))
    }

    fn create_column(&self, column: NewColumn) -> Result<Column> {
        let mut tables = self.tables.write();
        let column = Column {
            id: ColumnId::new(Uuid::new_v4().to_string()),
            name: column.name,
            column_type: column.column_type,
            order_index: column.order_index,
            settings: column.settings,
            created_seq: tables.next_seq(),
        };
        tables.columns.insert(column.id.clone(), column.clone());
        Ok(column)
    }

    fn update_column(&self, id: &ColumnId, patch: &ColumnPatch) -> Result<Column> {
        let mut tables = self.tables.write();
        let column = tables
            .columns
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(kind::COLUMN, id.as_str()))?;
        patch.apply_to(column);
        Ok(column.clone())
    }

    fn delete_column(&self, id: &ColumnId) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.columns.remove(id).is_none() {
            return Err(StoreError::not_found(kind::COLUMN, id.as_str()));
        }
        for cells in tables.cells.values_mut() {
            cells.remove(id);
        }
        Ok(())
    }

    fn get_rows(&self) -> Result<Vec<MaterializedRow>> {
        let tables = self.tables.read();
        let mut rows: Vec<MaterializedRow> =
            tables.rows.values().map(|r| tables.materialize(r)).collect();
        sort_for_display(&mut rows);
        Ok(rows)
    }

    fn get_row(&self, id: &RowId) -> Result<MaterializedRow> {
        let tables = self.tables.read();
        tables
            .rows
            .get(id)
            .map(|r| tables.materialize(r))
            .ok_or_else(|| StoreError::not_found(kind::ROW, id.as_str()))
    }

    fn create_row(&self, order_index: i64) -> Result<Row> {
        let mut tables = self.tables.write();
        let row = Row {
            id: RowId::new(Uuid::new_v4().to_string()),
            order_index,
            created_seq: tables.next_seq(),
        };
        tables.rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    fn delete_row(&self, id: &RowId) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.rows.remove(id).is_none() {
            return Err(StoreError::not_found(kind::ROW, id.as_str()));
        }
        tables.cells.remove(id);
        Ok(())
    }

    fn set_row_order(&self, id: &RowId, order_index: i64) -> Result<()> {
        let mut tables = self.tables.write();
        let row = tables
            .rows
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(kind::ROW, id.as_str()))?;
        row.order_index = order_index;
        Ok(())
    }

    fn get_cell(&self, row: &RowId, column: &ColumnId) -> Result<Option<StorageForm>> {
        let tables = self.tables.read();
        if !tables.rows.contains_key(row) {
            return Err(StoreError::not_found(kind::ROW, row.as_str()));
        }
        Ok(tables
            .cells
            .get(row)
            .and_then(|cells| cells.get(column))
            .cloned())
    }

    fn upsert_cell(&self, row: &RowId, column: &ColumnId, stored: StorageForm) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.rows.contains_key(row) {
            return Err(StoreError::not_found(kind::ROW, row.as_str()));
        }
        if !tables.columns.contains_key(column) {
            return Err(StoreError::not_found(kind::COLUMN, column.as_str()));
        }
        tables
            .cells
            .entry(row.clone())
            .or_default()
            .insert(column.clone(), stored);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabula_core::ColumnType;

    fn new_column(name: &str, order_index: i64) -> NewColumn {
        NewColumn {
            name: name.to_string(),
            column_type: ColumnType::Text,
            order_index,
            settings: None,
        }
    }

    #[test]
    fn test_upsert_keeps_one_cell_per_pair() {
        let store = MemoryStore::new();
        let column = store.create_column(new_column("Item", 0)).unwrap();
        let row = store.create_row(0).unwrap();

        store
            .upsert_cell(&row.id, &column.id, StorageForm::serialized("\"a\""))
            .unwrap();
        store
            .upsert_cell(&row.id, &column.id, StorageForm::serialized("\"b\""))
            .unwrap();

        let stored = store.get_row(&row.id).unwrap();
        assert_eq!(stored.cell_count(), 1);
        assert_eq!(
            stored.cell(&column.id),
            Some(&StorageForm::serialized("\"b\""))
        );
    }

    #[test]
    fn test_delete_column_cascades() {
        let store = MemoryStore::new();
        let keep = store.create_column(new_column("Keep", 0)).unwrap();
        let drop = store.create_column(new_column("Drop", 1)).unwrap();
        let row = store.create_row(0).unwrap();
        store
            .insert_cells(
                &row.id,
                vec![
                    (keep.id.clone(), StorageForm::serialized("1")),
                    (drop.id.clone(), StorageForm::serialized("2")),
                ],
            )
            .unwrap();

        store.delete_column(&drop.id).unwrap();
        let stored = store.get_row(&row.id).unwrap();
        assert_eq!(stored.cell_count(), 1);
        assert!(stored.cell(&drop.id).is_none());
    }

    #[test]
    fn test_listing_order_breaks_ties_by_creation() {
        let store = MemoryStore::new();
        let a = store.create_row(1).unwrap();
        let b = store.create_row(0).unwrap();
        let c = store.create_row(1).unwrap();
        let ids: Vec<RowId> = store
            .get_rows()
            .unwrap()
            .into_iter()
            .map(|r| r.row.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id, c.id]);
    }

    #[test]
    fn test_unknown_ids() {
        let store = MemoryStore::new();
        let column = store.create_column(new_column("Item", 0)).unwrap();
        let missing = RowId::new("missing");
        assert!(matches!(
            store.upsert_cell(&missing, &column.id, StorageForm::Empty),
            Err(StoreError::NotFound { kind: "Row", .. })
        ));
        assert!(matches!(
            store.delete_row(&missing),
            Err(StoreError::NotFound { .. })
        ));
    }
}
