//! Free-text search and structured filters
//!
//! A [`RowQuery`] combines an optional free-text search with an optional
//! single-column [`Filter`]; a row must satisfy both.
//!
//! Operator semantics:
//! - `equals`: string equality after coercing the cell value to a string
//! - `contains`: case-insensitive substring match on the coerced string
//! - `greater_than` / `less_than`: numeric comparison, except date columns
//!   which compare their `YYYY-MM-DD` strings
//! - `is_empty`: the cell is absent or holds `""`, `false` or `[]`
//! - anything else matches every row
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CellValue, ColumnType, Filter, FilterOperator};
//!
//! let filter = Filter::new("score", FilterOperator::GreaterThan, "3");
//! let five = CellValue::Number(5.0);
//! assert!(filter.matches(Some(&five), Some(ColumnType::Number)));
//! assert!(!filter.matches(None, Some(ColumnType::Number)));
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::cell::{coerce_str_number, CellValue};
use crate::column::{Column, ColumnId, ColumnType};
use crate::row::DecodedRow;

/// Filter operator
///
/// Unknown operator names are kept as [`FilterOperator::Other`] and match
/// every row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
    IsEmpty,
    Other(String),
}

impl FilterOperator {
    /// Parse an operator name; never fails
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "equals" => FilterOperator::Equals,
            "contains" => FilterOperator::Contains,
            "greater_than" => FilterOperator::GreaterThan,
            "less_than" => FilterOperator::LessThan,
            "is_empty" => FilterOperator::IsEmpty,
            other => FilterOperator::Other(other.to_string()),
        }
    }

    /// Operator name
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::Contains => "contains",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::LessThan => "less_than",
            FilterOperator::IsEmpty => "is_empty",
            FilterOperator::Other(name) => name.as_str(),
        }
    }

    /// Whether the operator is one of the fixed set
    pub fn is_known(&self) -> bool {
        !matches!(self, FilterOperator::Other(_))
    }

    /// Whether the operator takes a comparison value
    pub fn takes_value(&self) -> bool {
        !matches!(self, FilterOperator::IsEmpty)
    }
}

impl From<&str> for FilterOperator {
    fn from(name: &str) -> Self {
        FilterOperator::parse(name)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured single-column filter
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column_id: ColumnId,
    pub operator: FilterOperator,
    /// Comparison value as typed by the user (ignored by `is_empty`)
    pub value: String,
}

impl Filter {
    /// Create a new filter
    pub fn new<C, V>(column_id: C, operator: FilterOperator, value: V) -> Self
    where
        C: Into<ColumnId>,
        V: Into<String>,
    {
        Self {
            column_id: column_id.into(),
            operator,
            value: value.into(),
        }
    }

    /// Check a decoded cell value against the filter
    ///
    /// `value` is `None` when the row has no cell for the column or the cell
    /// decodes to empty. `column_type` is `None` when the column no longer
    /// exists.
    pub fn matches(&self, value: Option<&CellValue>, column_type: Option<ColumnType>) -> bool {
        let Some(value) = value else {
            return self.operator == FilterOperator::IsEmpty;
        };

        match &self.operator {
            FilterOperator::Equals => value.coerce_string() == self.value,
            FilterOperator::Contains => value
                .coerce_string()
                .to_lowercase()
                .contains(&self.value.to_lowercase()),
            FilterOperator::GreaterThan => {
                compare(value, &self.value, column_type) == Some(Ordering::Greater)
            }
            FilterOperator::LessThan => {
                compare(value, &self.value, column_type) == Some(Ordering::Less)
            }
            FilterOperator::IsEmpty => value.is_blank(),
            FilterOperator::Other(_) => true,
        }
    }
}

/// Order a cell value against a filter value; `None` means incomparable
fn compare(value: &CellValue, other: &str, column_type: Option<ColumnType>) -> Option<Ordering> {
    if column_type == Some(ColumnType::Date) {
        // ISO dates order correctly as strings
        let left = value.coerce_string();
        if left.is_empty() || other.is_empty() {
            return None;
        }
        return Some(left.as_str().cmp(other));
    }
    let left = value.coerce_number()?;
    // A blank comparison value counts as zero
    let right = if other.trim().is_empty() {
        0.0
    } else {
        coerce_str_number(other)?
    };
    left.partial_cmp(&right)
}

/// Free-text match over a row's values
///
/// A row matches when any value, lowercased and with list entries joined by
/// spaces, contains the lowercased query. An empty query matches everything.
pub fn matches_search<'a, I>(values: I, query: &str) -> bool
where
    I: IntoIterator<Item = &'a CellValue>,
{
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    values
        .into_iter()
        .any(|v| v.search_text().to_lowercase().contains(&needle))
}

/// Search and filter applied to a row set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowQuery {
    pub search: Option<String>,
    pub filter: Option<Filter>,
}

impl RowQuery {
    /// Create a query that matches every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text search
    pub fn with_search<S: Into<String>>(mut self, query: S) -> Self {
        self.search = Some(query.into());
        self
    }

    /// Set the structured filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Check whether the query narrows anything
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map_or(true, str::is_empty) && self.filter.is_none()
    }

    /// Check a decoded row against the query
    pub fn matches(&self, row: &DecodedRow, columns: &[Column]) -> bool {
        if let Some(query) = &self.search {
            if !matches_search(row.values(), query) {
                return false;
            }
        }
        match &self.filter {
            Some(filter) => {
                let column_type = columns
                    .iter()
                    .find(|c| c.id == filter.column_id)
                    .map(|c| c.column_type);
                filter.matches(row.value(&filter.column_id), column_type)
            }
            None => true,
        }
    }

    /// Keep the rows that match, preserving their order
    pub fn apply<'a>(&self, rows: &'a [DecodedRow], columns: &[Column]) -> Vec<&'a DecodedRow> {
        if let Some(Filter {
            operator: FilterOperator::Other(name),
            ..
        }) = &self.filter
        {
            log::debug!("Unknown filter operator {name:?}; not filtering");
        }
        rows.iter().filter(|r| self.matches(r, columns)).collect()
    }
}
