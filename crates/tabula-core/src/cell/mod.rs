//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] - The typed value of a non-empty cell
//! - [`StorageForm`] - The serialized form a store holds

mod storage;
mod value;

pub use storage::StorageForm;
pub use value::CellValue;

pub(crate) use value::coerce_str_number;
