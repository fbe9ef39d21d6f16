//! Ordering of rows and columns
//!
//! Rows and columns carry an integer `order_index` used purely as a sort
//! key. Indices are not required to be unique or contiguous: display order
//! sorts ascending by index and breaks ties by creation sequence.

use crate::column::Column;
use crate::row::{MaterializedRow, Row};

/// Something with a display position
pub trait Ordered {
    /// Primary sort key
    fn order_index(&self) -> i64;

    /// Tie-breaker: store-assigned creation sequence
    fn created_seq(&self) -> u64;
}

impl Ordered for Column {
    fn order_index(&self) -> i64 {
        self.order_index
    }

    fn created_seq(&self) -> u64 {
        self.created_seq
    }
}

impl Ordered for Row {
    fn order_index(&self) -> i64 {
        self.order_index
    }

    fn created_seq(&self) -> u64 {
        self.created_seq
    }
}

impl Ordered for MaterializedRow {
    fn order_index(&self) -> i64 {
        self.row.order_index
    }

    fn created_seq(&self) -> u64 {
        self.row.created_seq
    }
}

/// Index for an entity appended at the end: `max + 1`, or `0` if empty
pub fn next_order_index<I>(existing: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    existing.into_iter().max().map_or(0, |max| max.saturating_add(1))
}

/// Assign `order_index := position` for each id in sequence
pub fn reorder_assignments<T, I>(ids: I) -> Vec<(T, i64)>
where
    I: IntoIterator<Item = T>,
{
    ids.into_iter()
        .zip(0i64..)
        .collect()
}

/// Sort into display order
pub fn sort_for_display<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| (item.order_index(), item.created_seq()));
}
