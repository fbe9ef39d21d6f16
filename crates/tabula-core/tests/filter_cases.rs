//! Search and filter behavior over materialized rows

use pretty_assertions::assert_eq;
use tabula_core::format::format;
use tabula_core::{
    Column, ColumnId, ColumnType, DisplayValue, Filter, FilterOperator, FormatOptions,
    MaterializedRow, Row, RowId, RowQuery, StorageForm,
};

fn column(id: &str, column_type: ColumnType, order_index: i64) -> Column {
    Column {
        id: ColumnId::new(id),
        name: id.to_string(),
        column_type,
        order_index,
        settings: None,
        created_seq: order_index as u64,
    }
}

fn columns() -> Vec<Column> {
    vec![
        column("score", ColumnType::Number, 0),
        column("done", ColumnType::Checkbox, 1),
        column("tags", ColumnType::MultiSelect, 2),
        column("due", ColumnType::Date, 3),
        column("notes", ColumnType::Text, 4),
    ]
}

fn row(id: &str, seq: u64) -> MaterializedRow {
    MaterializedRow::new(Row {
        id: RowId::new(id),
        order_index: seq as i64,
        created_seq: seq,
    })
}

fn sample_row() -> MaterializedRow {
    row("r1", 0)
        .with_cell("score".into(), StorageForm::serialized("5"))
        .with_cell("tags".into(), StorageForm::serialized(r#"["Ops","Tech"]"#))
        .with_cell("due".into(), StorageForm::serialized("\"2024-01-10\""))
}

fn query_matches(query: &RowQuery, row: &MaterializedRow) -> bool {
    let columns = columns();
    query.matches(&row.decode(&columns), &columns)
}

/// Number filters compare numerically
#[test]
fn test_number_greater_and_less_than() {
    let row = sample_row();
    let gt = RowQuery::new().with_filter(Filter::new("score", FilterOperator::GreaterThan, "3"));
    let lt = RowQuery::new().with_filter(Filter::new("score", FilterOperator::LessThan, "3"));
    assert!(query_matches(&gt, &row));
    assert!(!query_matches(&lt, &row));
}

/// A checkbox with no stored cell counts as empty
#[test]
fn test_checkbox_without_cell_is_empty() {
    let q = RowQuery::new().with_filter(Filter::new("done", FilterOperator::IsEmpty, ""));
    assert!(query_matches(&q, &sample_row()));

    let checked = sample_row().with_cell("done".into(), StorageForm::serialized("true"));
    assert!(!query_matches(&q, &checked));
}

/// Free-text search looks inside multi-select lists
#[test]
fn test_search_multi_select() {
    assert!(query_matches(&RowQuery::new().with_search("tech"), &sample_row()));
    assert!(!query_matches(&RowQuery::new().with_search("finance"), &sample_row()));
}

/// Dates compare as ISO strings
#[test]
fn test_date_before() {
    let q = RowQuery::new().with_filter(Filter::new("due", FilterOperator::LessThan, "2024-02-01"));
    assert!(query_matches(&q, &sample_row()));
}

/// Malformed storage reads as empty everywhere
#[test]
fn test_malformed_storage_reads_as_empty() {
    let columns = columns();
    let broken = row("r2", 1).with_cell("notes".into(), StorageForm::serialized("{\"unterminated"));
    let decoded = broken.decode(&columns);

    assert_eq!(decoded.value(&"notes".into()), None);
    assert_eq!(
        format(
            decoded.value(&"notes".into()),
            ColumnType::Text,
            None,
            &FormatOptions::default()
        ),
        DisplayValue::Empty
    );

    let empty = RowQuery::new().with_filter(Filter::new("notes", FilterOperator::IsEmpty, ""));
    assert!(empty.matches(&decoded, &columns));
}

/// Search and filter must both hold
#[test]
fn test_search_and_filter_compose() {
    let q = RowQuery::new()
        .with_search("ops")
        .with_filter(Filter::new("score", FilterOperator::Equals, "5"));
    assert!(query_matches(&q, &sample_row()));

    let q = q.with_search("nothing like this");
    assert!(!query_matches(&q, &sample_row()));
}

/// A filter on a deleted column only passes with `is_empty`
#[test]
fn test_filter_on_missing_column() {
    let q = RowQuery::new().with_filter(Filter::new("gone", FilterOperator::Contains, ""));
    assert!(!query_matches(&q, &sample_row()));

    let q = RowQuery::new().with_filter(Filter::new("gone", FilterOperator::IsEmpty, ""));
    assert!(query_matches(&q, &sample_row()));
}

/// `apply` keeps input order
#[test]
fn test_apply_preserves_order() {
    let columns = columns();
    let rows: Vec<_> = (0..4)
        .map(|i| {
            row(&format!("r{i}"), i).with_cell("score".into(), StorageForm::serialized(i.to_string()))
        })
        .map(|r| r.decode(&columns))
        .collect();

    let q = RowQuery::new().with_filter(Filter::new("score", FilterOperator::GreaterThan, "0"));
    let ids: Vec<&str> = q.apply(&rows, &columns).iter().map(|r| r.id().as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2", "r3"]);
}
