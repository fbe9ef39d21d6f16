//! End-to-end behavior of the database service over both stores

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tabula::prelude::*;
use tabula::StorageForm;

fn sqlite_db() -> (tempfile::TempDir, Database<SqliteStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("tabula.db")).unwrap();
    (dir, Database::new(store))
}

fn row_ids<S: Store>(db: &Database<S>) -> Vec<RowId> {
    db.rows().unwrap().into_iter().map(|r| r.row.id).collect()
}

fn filter_count<S: Store>(db: &Database<S>, column: &ColumnId, op: &str, value: &str) -> usize {
    let query = RowQuery::new().with_filter(Filter::new(
        column.clone(),
        FilterOperator::parse(op),
        value,
    ));
    db.table(&query).unwrap().rows.len()
}

/// Edits to a duplicate never reach the source, and vice versa
#[test]
fn test_duplicate_row_isolation() {
    let (_dir, db) = sqlite_db();
    let item = db.create_column("Item", ColumnType::Text).unwrap();
    let tags = db.create_column("Tags", ColumnType::MultiSelect).unwrap();
    let source = db.create_row().unwrap();
    db.update_cell(&source.id, &item.id, "Original").unwrap();
    db.update_cell(&source.id, &tags.id, r#"["Ops"]"#).unwrap();

    let copy = db.duplicate_row(&source.id).unwrap();
    assert_eq!(row_ids(&db), vec![source.id.clone(), copy.id.clone()]);
    assert_eq!(
        db.cell(&copy.id, &tags.id).unwrap(),
        Some(CellValue::list(["Ops"]))
    );

    db.update_cell(&source.id, &item.id, "Changed").unwrap();
    db.update_cell(&copy.id, &tags.id, r#"["Tech"]"#).unwrap();

    assert_eq!(
        db.cell(&copy.id, &item.id).unwrap(),
        Some(CellValue::text("Original"))
    );
    assert_eq!(
        db.cell(&source.id, &tags.id).unwrap(),
        Some(CellValue::list(["Ops"]))
    );
}

/// Duplicating through the default per-cell path behaves the same
#[test]
fn test_duplicate_row_memory_store() {
    let db = Database::new(MemoryStore::new());
    let done = db.create_column("Done?", ColumnType::Checkbox).unwrap();
    let source = db.create_row().unwrap();
    db.update_cell(&source.id, &done.id, "yes").unwrap();

    let copy = db.duplicate_row(&source.id).unwrap();
    db.clear_cell(&source.id, &done.id).unwrap();
    assert_eq!(
        db.cell(&copy.id, &done.id).unwrap(),
        Some(CellValue::Boolean(true))
    );
    assert!(db.duplicate_row(&RowId::new("missing")).is_err());
}

/// Rejected input leaves the stored value alone, for every type
#[test]
fn test_validation_gate() {
    let (_dir, db) = sqlite_db();
    let row = db.create_row().unwrap();
    let cases = [
        (ColumnType::Number, "42", "forty-two"),
        (ColumnType::Date, "2024-01-10", "10/01/2024"),
        (ColumnType::Url, "https://example.com", "not a link"),
        (ColumnType::MultiSelect, r#"["Ops"]"#, r#"["Ops", 3]"#),
    ];
    for (column_type, good, bad) in cases {
        let column = db.create_column(column_type.as_str(), column_type).unwrap();
        let stored = db.update_cell(&row.id, &column.id, good).unwrap();
        let err = db.update_cell(&row.id, &column.id, bad).unwrap_err();
        assert_eq!(
            err,
            Error::ValidationFailed {
                column_type: column_type.as_str()
            }
        );
        assert_eq!(db.cell(&row.id, &column.id).unwrap(), stored);
    }
}

/// Filter cases from the evaluator, run through stored data
#[test]
fn test_filters_over_stored_rows() {
    let (_dir, db) = sqlite_db();
    let score = db.create_column("Score", ColumnType::Number).unwrap();
    let done = db.create_column("Done?", ColumnType::Checkbox).unwrap();
    let tags = db.create_column("Tags", ColumnType::MultiSelect).unwrap();
    let due = db.create_column("Due", ColumnType::Date).unwrap();

    let row = db.create_row().unwrap();
    db.update_cell(&row.id, &score.id, "5").unwrap();
    db.update_cell(&row.id, &tags.id, r#"["Ops","Tech"]"#).unwrap();
    db.update_cell(&row.id, &due.id, "2024-01-10").unwrap();

    assert_eq!(filter_count(&db, &score.id, "greater_than", "3"), 1);
    assert_eq!(filter_count(&db, &score.id, "less_than", "3"), 0);
    assert_eq!(filter_count(&db, &done.id, "is_empty", ""), 1);
    assert_eq!(filter_count(&db, &due.id, "less_than", "2024-02-01"), 1);
    assert_eq!(filter_count(&db, &due.id, "no_such_operator", "x"), 1);

    let view = db.table(&RowQuery::new().with_search("tech")).unwrap();
    assert_eq!(view.rows.len(), 1);
}

/// After a type change old values still read, shown as their string form
#[test]
fn test_type_change_is_tolerated() {
    let db = Database::new(MemoryStore::new());
    let tags = db.create_column("Tags", ColumnType::MultiSelect).unwrap();
    let row = db.create_row().unwrap();
    db.update_cell(&row.id, &tags.id, r#"["Ops","Tech"]"#).unwrap();

    db.change_column_type(&tags.id, ColumnType::Number).unwrap();
    let view = db.table(&RowQuery::new()).unwrap();
    assert_eq!(
        view.rows[0].display[0],
        DisplayValue::Text("Ops, Tech".to_string())
    );
    assert_eq!(filter_count(&db, &tags.id, "greater_than", "0"), 0);
}

/// Deleting a column removes its cells from every row
#[test]
fn test_delete_column_cascades() {
    let (_dir, db) = sqlite_db();
    let notes = db.create_column("Notes", ColumnType::Text).unwrap();
    let row = db.create_row().unwrap();
    db.update_cell(&row.id, &notes.id, "gone soon").unwrap();

    db.delete_column(&notes.id).unwrap();
    assert_eq!(db.row(&row.id).unwrap().cell_count(), 0);
    assert!(db.column(&notes.id).unwrap_err().is_not_found());
}

/// Malformed stored content shows the empty placeholder
#[test]
fn test_malformed_cell_renders_empty() {
    let db = Database::new(MemoryStore::new());
    let notes = db.create_column("Notes", ColumnType::Text).unwrap();
    let row = db.create_row().unwrap();
    db.store()
        .upsert_cell(&row.id, &notes.id, StorageForm::serialized("{broken"))
        .unwrap();

    assert_eq!(db.cell(&row.id, &notes.id).unwrap(), None);
    let view = db.table(&RowQuery::new()).unwrap();
    assert_eq!(view.rows[0].display[0], DisplayValue::Empty);
    assert_eq!(view.rows[0].render(&FormatOptions::default()), vec!["Empty"]);
}

#[test]
fn test_sequential_writes_option() {
    let options = DatabaseOptions {
        parallel_writes: false,
        ..Default::default()
    };
    let db = Database::with_options(MemoryStore::new(), options);
    let a = db.create_column("A", ColumnType::Text).unwrap();
    let b = db.create_column("B", ColumnType::Text).unwrap();

    db.reorder_columns(&[b.id.clone(), a.id.clone()]).unwrap();
    let ids: Vec<ColumnId> = db.columns().unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Reordering twice with the same sequence gives the same order as once
    #[test]
    fn prop_reorder_rows_idempotent(seed in Just((0..6).collect::<Vec<usize>>()).prop_shuffle()) {
        let db = Database::new(MemoryStore::new());
        let created: Vec<RowId> = (0..6).map(|_| db.create_row().unwrap().id).collect();
        let sequence: Vec<RowId> = seed.iter().map(|&i| created[i].clone()).collect();

        db.reorder_rows(&sequence).unwrap();
        let once = row_ids(&db);
        db.reorder_rows(&sequence).unwrap();
        let twice = row_ids(&db);

        prop_assert_eq!(&once, &sequence);
        prop_assert_eq!(once, twice);
    }
}
