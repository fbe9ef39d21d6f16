//! The database service
//!
//! [`Database`] wires the core (registry, codec, filters, ordering) to an
//! injected [`Store`]. Every operation is scoped: a failure affects only the
//! requested operation and leaves previously stored values untouched.
//!
//! # Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let db = Database::new(MemoryStore::new());
//! let score = db.create_column("Score", ColumnType::Number).unwrap();
//! let row = db.create_row().unwrap();
//!
//! db.update_cell(&row.id, &score.id, "5").unwrap();
//! assert!(db.update_cell(&row.id, &score.id, "five").is_err());
//!
//! let query = RowQuery::new().with_filter(Filter::new(
//!     score.id.clone(),
//!     FilterOperator::GreaterThan,
//!     "3",
//! ));
//! assert_eq!(db.table(&query).unwrap().rows.len(), 1);
//! ```

use std::collections::HashSet;
use std::hash::Hash;

use rayon::prelude::*;
use tabula_core::format::format;
use tabula_core::{
    codec, edit, next_order_index, registry, reorder_assignments, validate_column_name,
    CellValue, Column, ColumnId, ColumnPatch, ColumnSettings, ColumnType, Error, FormatOptions,
    MaterializedRow, NewColumn, OptionColor, Result, Row, RowId, RowQuery, SelectOption,
    StorageForm,
};
use tabula_store::Store;

use crate::view::{RowView, TableView};

/// Options for a [`Database`]
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// How values are rendered in table views
    pub format: FormatOptions,
    /// Issue bulk reorder writes in parallel (otherwise one after another)
    pub parallel_writes: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            format: FormatOptions::default(),
            parallel_writes: true,
        }
    }
}

/// A shared table backed by a store
pub struct Database<S: Store> {
    store: S,
    options: DatabaseOptions,
}

impl<S: Store> Database<S> {
    /// Create a database over a store with default options
    pub fn new(store: S) -> Self {
        Self::with_options(store, DatabaseOptions::default())
    }

    /// Create a database over a store
    pub fn with_options(store: S, options: DatabaseOptions) -> Self {
        Self { store, options }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The options in effect
    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    // === Columns ===

    /// All columns in display order
    pub fn columns(&self) -> Result<Vec<Column>> {
        Ok(self.store.get_columns()?)
    }

    /// A single column
    pub fn column(&self, id: &ColumnId) -> Result<Column> {
        Ok(self.store.get_column(id)?)
    }

    /// Append a column
    ///
    /// Select and multi-select columns start with an empty option list.
    pub fn create_column(&self, name: &str, column_type: ColumnType) -> Result<Column> {
        let name = validate_column_name(name)?;
        let order_index = next_order_index(self.columns()?.iter().map(|c| c.order_index));
        let settings = column_type.uses_options().then(ColumnSettings::empty);
        let column = self.store.create_column(NewColumn {
            name,
            column_type,
            order_index,
            settings,
        })?;
        log::debug!("Created {} column {:?} ({})", column_type, column.name, column.id);
        Ok(column)
    }

    /// Rename a column
    pub fn rename_column(&self, id: &ColumnId, name: &str) -> Result<Column> {
        self.update_column(
            id,
            ColumnPatch {
                name: Some(name.to_string()),
                ..Default::default()
            },
        )
    }

    /// Change a column's type
    ///
    /// Existing cells are kept as stored; reads decode them tolerantly.
    /// Leaving the select family drops the option list, entering it installs
    /// an empty one, and moving between select and multi-select keeps it.
    pub fn change_column_type(&self, id: &ColumnId, column_type: ColumnType) -> Result<Column> {
        let column = self.column(id)?;
        if column.column_type == column_type {
            return Ok(column);
        }
        let settings = match (column.column_type.uses_options(), column_type.uses_options()) {
            (true, false) => Some(None),
            (false, true) => Some(Some(ColumnSettings::empty())),
            (true, true) if column.settings.is_none() => Some(Some(ColumnSettings::empty())),
            _ => None,
        };
        self.update_column(
            id,
            ColumnPatch {
                column_type: Some(column_type),
                settings,
                ..Default::default()
            },
        )
    }

    /// Replace a select column's option list
    ///
    /// Labels are trimmed and blanks dropped. Existing options keep their
    /// color; new labels start gray.
    pub fn set_column_options<I, L>(&self, id: &ColumnId, labels: I) -> Result<Column>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let column = self.column(id)?;
        let current = column.settings.unwrap_or_default();
        let options = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .map(|label| {
                let color = current
                    .option(&label)
                    .map_or(OptionColor::default(), |o| o.color);
                SelectOption::new(label, color)
            })
            .collect();
        self.update_column(
            id,
            ColumnPatch {
                settings: Some(Some(ColumnSettings::with_options(options))),
                ..Default::default()
            },
        )
    }

    /// Apply a partial update
    pub fn update_column(&self, id: &ColumnId, mut patch: ColumnPatch) -> Result<Column> {
        if let Some(name) = &patch.name {
            patch.name = Some(validate_column_name(name)?);
        }
        if patch.is_empty() {
            return self.column(id);
        }
        let column = self.store.update_column(id, &patch)?;
        log::debug!("Updated column {}", id);
        Ok(column)
    }

    /// Delete a column and its cells
    pub fn delete_column(&self, id: &ColumnId) -> Result<()> {
        self.store.delete_column(id)?;
        log::debug!("Deleted column {}", id);
        Ok(())
    }

    /// Give each listed column its position in `ids` as its new order
    ///
    /// Unknown ids are rejected before anything is written. Columns left out
    /// keep their current index. The writes are independent and not atomic.
    pub fn reorder_columns(&self, ids: &[ColumnId]) -> Result<()> {
        let known: HashSet<ColumnId> = self.columns()?.into_iter().map(|c| c.id).collect();
        check_reorder_ids(ids, &known, "Column")?;
        self.write_all(reorder_assignments(ids.iter().cloned()), |(id, order_index)| {
            let patch = ColumnPatch {
                order_index: Some(order_index),
                ..Default::default()
            };
            self.store.update_column(&id, &patch).map(|_| ())
        })?;
        log::debug!("Reordered {} columns", ids.len());
        Ok(())
    }

    // === Rows ===

    /// All rows with their stored cells, in display order
    pub fn rows(&self) -> Result<Vec<MaterializedRow>> {
        Ok(self.store.get_rows()?)
    }

    /// A single row with its stored cells
    pub fn row(&self, id: &RowId) -> Result<MaterializedRow> {
        Ok(self.store.get_row(id)?)
    }

    /// Append an empty row
    pub fn create_row(&self) -> Result<Row> {
        let order_index = next_order_index(self.rows()?.iter().map(|r| r.row.order_index));
        let row = self.store.create_row(order_index)?;
        log::debug!("Created row {}", row.id);
        Ok(row)
    }

    /// Delete a row and its cells
    pub fn delete_row(&self, id: &RowId) -> Result<()> {
        self.store.delete_row(id)?;
        log::debug!("Deleted row {}", id);
        Ok(())
    }

    /// Copy a row, with all of its cells, to the end of the table
    pub fn duplicate_row(&self, id: &RowId) -> Result<Row> {
        Ok(self.store.duplicate_row(id)?)
    }

    /// Give each listed row its position in `ids` as its new order
    ///
    /// Same rules as [`reorder_columns`](Self::reorder_columns).
    pub fn reorder_rows(&self, ids: &[RowId]) -> Result<()> {
        let known: HashSet<RowId> = self.rows()?.into_iter().map(|r| r.row.id).collect();
        check_reorder_ids(ids, &known, "Row")?;
        self.write_all(reorder_assignments(ids.iter().cloned()), |(id, order_index)| {
            self.store.set_row_order(&id, order_index)
        })?;
        log::debug!("Reordered {} rows", ids.len());
        Ok(())
    }

    // === Cells ===

    /// Decoded value of a cell; `None` when empty, absent or malformed
    pub fn cell(&self, row: &RowId, column: &ColumnId) -> Result<Option<CellValue>> {
        let column = self.column(column)?;
        let stored = self.store.get_cell(row, &column.id)?;
        Ok(stored.and_then(|s| codec::decode(&s, column.column_type)))
    }

    /// Parse, validate and store raw input for a cell
    ///
    /// Returns the stored value (`None` for empty). On
    /// [`Error::ValidationFailed`] nothing is written.
    pub fn update_cell(
        &self,
        row: &RowId,
        column: &ColumnId,
        raw: &str,
    ) -> Result<Option<CellValue>> {
        let column = self.column(column)?;
        let value = registry::check(column.column_type, raw)?;
        self.store
            .upsert_cell(row, &column.id, codec::encode(value.as_ref()))?;
        log::debug!("Updated cell ({}, {})", row, column.id);
        Ok(value)
    }

    /// Store text typed into an edit box
    ///
    /// The text is normalized first (URL scheme, comma-separated labels,
    /// checkbox state) and then handled like [`update_cell`](Self::update_cell).
    pub fn edit_cell(
        &self,
        row: &RowId,
        column: &ColumnId,
        text: &str,
    ) -> Result<Option<CellValue>> {
        let column_type = self.column(column)?.column_type;
        let raw = edit::normalize_input(column_type, text)?;
        self.update_cell(row, column, &raw)
    }

    /// Store the empty marker for a cell
    pub fn clear_cell(&self, row: &RowId, column: &ColumnId) -> Result<()> {
        self.store.upsert_cell(row, column, StorageForm::Empty)?;
        log::debug!("Cleared cell ({}, {})", row, column);
        Ok(())
    }

    // === Views ===

    /// Columns and the rows matching `query`, decoded and formatted
    pub fn table(&self, query: &RowQuery) -> Result<TableView> {
        let columns = self.columns()?;
        let decoded: Vec<_> = self.rows()?.iter().map(|r| r.decode(&columns)).collect();
        let rows = query
            .apply(&decoded, &columns)
            .into_iter()
            .map(|row| {
                let values: Vec<Option<CellValue>> =
                    columns.iter().map(|c| row.value(&c.id).cloned()).collect();
                let display = columns
                    .iter()
                    .zip(&values)
                    .map(|(c, v)| {
                        format(v.as_ref(), c.column_type, c.settings.as_ref(), &self.options.format)
                    })
                    .collect();
                RowView {
                    row: row.row.clone(),
                    values,
                    display,
                }
            })
            .collect();
        Ok(TableView { columns, rows })
    }

    /// Run independent writes, in parallel unless configured otherwise
    ///
    /// All writes are attempted; the first failure observed is returned.
    fn write_all<T, F>(&self, items: Vec<T>, write: F) -> Result<()>
    where
        T: Send,
        F: Fn(T) -> tabula_store::Result<()> + Send + Sync,
    {
        let results: Vec<tabula_store::Result<()>> = if self.options.parallel_writes {
            items.into_par_iter().map(&write).collect()
        } else {
            items.into_iter().map(&write).collect()
        };
        for result in results {
            result?;
        }
        Ok(())
    }
}

/// Reject reorder lists naming unknown or repeated ids
fn check_reorder_ids<T>(ids: &[T], known: &HashSet<T>, kind: &'static str) -> Result<()>
where
    T: Eq + Hash + std::fmt::Display,
{
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !known.contains(id) {
            return Err(Error::not_found(kind, id.to_string()));
        }
        if !seen.insert(id) {
            return Err(Error::other(format!("{kind} {id} listed more than once")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabula_store::MemoryStore;

    fn db() -> Database<MemoryStore> {
        Database::new(MemoryStore::new())
    }

    #[test]
    fn test_select_columns_start_with_empty_options() {
        let db = db();
        let status = db.create_column("Status", ColumnType::Select).unwrap();
        let notes = db.create_column("Notes", ColumnType::Text).unwrap();
        assert_eq!(status.settings, Some(ColumnSettings::empty()));
        assert_eq!(notes.settings, None);
        assert_eq!((status.order_index, notes.order_index), (0, 1));
    }

    #[test]
    fn test_column_name_rules() {
        let db = db();
        assert_eq!(db.create_column("  Item ", ColumnType::Text).unwrap().name, "Item");
        assert!(matches!(
            db.create_column("   ", ColumnType::Text),
            Err(Error::InvalidColumnName(_))
        ));
        assert!(db.create_column(&"x".repeat(101), ColumnType::Text).is_err());
    }

    #[test]
    fn test_change_column_type_settings() {
        let db = db();
        let column = db.create_column("Tags", ColumnType::Text).unwrap();

        let column = db.change_column_type(&column.id, ColumnType::MultiSelect).unwrap();
        assert_eq!(column.settings, Some(ColumnSettings::empty()));

        let column = db.set_column_options(&column.id, ["Ops", " ", "Tech "]).unwrap();
        let column = db.change_column_type(&column.id, ColumnType::Select).unwrap();
        assert_eq!(column.options().len(), 2);

        let column = db.change_column_type(&column.id, ColumnType::Text).unwrap();
        assert_eq!(column.settings, None);
    }

    #[test]
    fn test_set_column_options_keeps_colors() {
        let db = db();
        let column = db.create_column("Status", ColumnType::Select).unwrap();
        db.update_column(
            &column.id,
            ColumnPatch {
                settings: Some(Some(ColumnSettings::with_options(vec![SelectOption::new(
                    "Done",
                    OptionColor::Green,
                )]))),
                ..Default::default()
            },
        )
        .unwrap();

        let column = db.set_column_options(&column.id, ["Done", "Blocked"]).unwrap();
        assert_eq!(
            column.options(),
            &[
                SelectOption::new("Done", OptionColor::Green),
                SelectOption::new("Blocked", OptionColor::Gray),
            ]
        );
    }

    #[test]
    fn test_rejected_write_keeps_prior_value() {
        let db = db();
        let due = db.create_column("Due", ColumnType::Date).unwrap();
        let row = db.create_row().unwrap();

        db.update_cell(&row.id, &due.id, "2024-01-10").unwrap();
        assert_eq!(
            db.update_cell(&row.id, &due.id, "Jan 10"),
            Err(Error::ValidationFailed { column_type: "date" })
        );
        assert_eq!(
            db.cell(&row.id, &due.id).unwrap(),
            Some(CellValue::text("2024-01-10"))
        );
    }

    #[test]
    fn test_update_cell_unknown_column() {
        let db = db();
        let row = db.create_row().unwrap();
        assert!(db
            .update_cell(&row.id, &ColumnId::new("missing"), "x")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_edit_cell_normalizes() {
        let db = db();
        let link = db.create_column("Link", ColumnType::Url).unwrap();
        let tags = db.create_column("Tags", ColumnType::MultiSelect).unwrap();
        let row = db.create_row().unwrap();

        assert_eq!(
            db.edit_cell(&row.id, &link.id, "example.com").unwrap(),
            Some(CellValue::text("https://example.com"))
        );
        assert_eq!(
            db.edit_cell(&row.id, &tags.id, "Ops, Tech").unwrap(),
            Some(CellValue::list(["Ops", "Tech"]))
        );
    }

    #[test]
    fn test_clear_cell() {
        let db = db();
        let notes = db.create_column("Notes", ColumnType::Text).unwrap();
        let row = db.create_row().unwrap();
        db.update_cell(&row.id, &notes.id, "hello").unwrap();
        db.clear_cell(&row.id, &notes.id).unwrap();
        assert_eq!(db.cell(&row.id, &notes.id).unwrap(), None);
    }

    #[test]
    fn test_reorder_rejects_unknown_and_repeated_ids() {
        let db = db();
        let a = db.create_row().unwrap();
        let b = db.create_row().unwrap();

        assert!(db
            .reorder_rows(&[b.id.clone(), RowId::new("ghost")])
            .unwrap_err()
            .is_not_found());
        assert!(db.reorder_rows(&[a.id.clone(), a.id.clone()]).is_err());

        let ids: Vec<RowId> = db.rows().unwrap().into_iter().map(|r| r.row.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_reorder_partial_list() {
        let db = db();
        let a = db.create_row().unwrap();
        let b = db.create_row().unwrap();
        let c = db.create_row().unwrap();

        // c -> 0; a and b keep 0 and 1, so a/c tie and break on creation
        db.reorder_rows(&[c.id.clone()]).unwrap();
        let ids: Vec<RowId> = db.rows().unwrap().into_iter().map(|r| r.row.id).collect();
        assert_eq!(ids, vec![a.id, c.id, b.id]);
    }
}
