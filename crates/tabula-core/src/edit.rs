//! Edit-mode text conversion
//!
//! An edit box shows a cell as a single string and hands a string back. These
//! helpers produce that string from a decoded value and normalize what the
//! user typed into the raw input that [`crate::registry::parse`] expects.

use crate::cell::{coerce_str_number, CellValue};
use crate::column::ColumnType;
use crate::error::{Error, Result};
use crate::registry::is_date_string;

/// String shown in an edit box for a decoded value
pub fn edit_text(value: Option<&CellValue>, column_type: ColumnType) -> String {
    match (column_type, value) {
        (ColumnType::Checkbox, v) => {
            let checked = matches!(v, Some(CellValue::Boolean(true)));
            checked.to_string()
        }
        (ColumnType::MultiSelect, Some(CellValue::List(labels))) => labels.join(", "),
        (ColumnType::MultiSelect, _) => String::new(),
        (_, Some(v)) => v.to_string(),
        (_, None) => String::new(),
    }
}

/// Normalize edit-box text into raw input for parsing
///
/// Rejects non-blank dates that are not `YYYY-MM-DD` and non-blank numbers
/// that do not parse. URLs without an `http://` or `https://` scheme get
/// `https://` prepended.
pub fn normalize_input(column_type: ColumnType, text: &str) -> Result<String> {
    let trimmed = text.trim();
    let rejected = || Error::ValidationFailed {
        column_type: column_type.as_str(),
    };

    let raw = match column_type {
        ColumnType::Checkbox => String::from(if trimmed == "true" { "true" } else { "false" }),
        ColumnType::MultiSelect => {
            let labels: Vec<&str> = trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            serde_json::to_string(&labels).map_err(|e| Error::other(e.to_string()))?
        }
        ColumnType::Date if !trimmed.is_empty() && !is_date_string(trimmed) => {
            return Err(rejected());
        }
        ColumnType::Number if !trimmed.is_empty() && coerce_str_number(trimmed).is_none() => {
            return Err(rejected());
        }
        ColumnType::Url
            if !trimmed.is_empty()
                && !trimmed.starts_with("http://")
                && !trimmed.starts_with("https://") =>
        {
            format!("https://{trimmed}")
        }
        _ => trimmed.to_string(),
    };
    Ok(raw)
}
