//! Column type registry
//!
//! One [`TypeDef`] entry per [`ColumnType`], holding the raw-input parser, the
//! validator and the filter operators offered for that type. Lookup goes
//! through an exhaustive match, so adding a column type without a registry
//! entry fails to compile.
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{registry, CellValue, ColumnType};
//!
//! let value = registry::check(ColumnType::Number, "5").unwrap();
//! assert_eq!(value, Some(CellValue::Number(5.0)));
//!
//! assert!(registry::check(ColumnType::Date, "10/01/2024").is_err());
//! ```

use lazy_regex::regex_is_match;

use crate::cell::{coerce_str_number, CellValue};
use crate::column::ColumnType;
use crate::error::{Error, Result};
use crate::filter::FilterOperator;

/// Raw-input parser signature
pub type ParseFn = fn(&str) -> Option<CellValue>;

/// Validator signature
pub type ValidateFn = fn(&CellValue) -> bool;

/// Registry entry for a column type
pub struct TypeDef {
    /// The type this entry describes
    pub column_type: ColumnType,
    /// Wire tag
    pub name: &'static str,
    /// Human-readable name
    pub label: &'static str,
    /// Parser for non-blank raw input
    pub parse: ParseFn,
    /// Validator for parsed values
    pub validate: ValidateFn,
    /// Filter operators offered for this type
    pub operators: &'static [FilterOperator],
}

impl std::fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDef")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish()
    }
}

static TEXT: TypeDef = TypeDef {
    column_type: ColumnType::Text,
    name: "text",
    label: "Text",
    parse: parse_verbatim,
    validate: validate_string,
    operators: &[
        FilterOperator::Equals,
        FilterOperator::Contains,
        FilterOperator::IsEmpty,
    ],
};

static NUMBER: TypeDef = TypeDef {
    column_type: ColumnType::Number,
    name: "number",
    label: "Number",
    parse: parse_number,
    validate: validate_number,
    operators: &[
        FilterOperator::Equals,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::IsEmpty,
    ],
};

static SELECT: TypeDef = TypeDef {
    column_type: ColumnType::Select,
    name: "select",
    label: "Select",
    parse: parse_verbatim,
    validate: validate_string,
    operators: &[FilterOperator::Equals, FilterOperator::IsEmpty],
};

static MULTI_SELECT: TypeDef = TypeDef {
    column_type: ColumnType::MultiSelect,
    name: "multi_select",
    label: "Multi-select",
    parse: parse_list,
    validate: validate_list,
    operators: &[FilterOperator::Equals, FilterOperator::IsEmpty],
};

static DATE: TypeDef = TypeDef {
    column_type: ColumnType::Date,
    name: "date",
    label: "Date",
    parse: parse_verbatim,
    validate: validate_date,
    operators: &[
        FilterOperator::Equals,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::IsEmpty,
    ],
};

static CHECKBOX: TypeDef = TypeDef {
    column_type: ColumnType::Checkbox,
    name: "checkbox",
    label: "Checkbox",
    parse: parse_checkbox,
    validate: validate_checkbox,
    operators: &[FilterOperator::Equals, FilterOperator::IsEmpty],
};

static URL: TypeDef = TypeDef {
    column_type: ColumnType::Url,
    name: "url",
    label: "URL",
    parse: parse_verbatim,
    validate: validate_url,
    operators: &[
        FilterOperator::Equals,
        FilterOperator::Contains,
        FilterOperator::IsEmpty,
    ],
};

/// Look up the registry entry for a column type
pub fn type_def(column_type: ColumnType) -> &'static TypeDef {
    match column_type {
        ColumnType::Text => &TEXT,
        ColumnType::Number => &NUMBER,
        ColumnType::Select => &SELECT,
        ColumnType::MultiSelect => &MULTI_SELECT,
        ColumnType::Date => &DATE,
        ColumnType::Checkbox => &CHECKBOX,
        ColumnType::Url => &URL,
    }
}

/// Iterate over every registry entry
pub fn all() -> impl Iterator<Item = &'static TypeDef> {
    ColumnType::ALL.into_iter().map(type_def)
}

/// Parse raw user input into the type's canonical value
///
/// Blank input yields `false` for checkboxes, an empty list for
/// multi-selects and `None` for everything else. `None` for non-blank number
/// input means the input was rejected.
pub fn parse(column_type: ColumnType, raw: &str) -> Option<CellValue> {
    if raw.trim().is_empty() {
        return match column_type {
            ColumnType::Checkbox => Some(CellValue::Boolean(false)),
            ColumnType::MultiSelect => Some(CellValue::List(Vec::new())),
            _ => None,
        };
    }
    (type_def(column_type).parse)(raw)
}

/// Re-check a parsed value against the type's contract
pub fn validate(column_type: ColumnType, value: &CellValue) -> bool {
    (type_def(column_type).validate)(value)
}

/// Parse and validate together
///
/// Returns the value to store (`None` meaning empty), or
/// [`Error::ValidationFailed`] when the input must not be written.
pub fn check(column_type: ColumnType, raw: &str) -> Result<Option<CellValue>> {
    let rejected = Error::ValidationFailed {
        column_type: column_type.as_str(),
    };
    match parse(column_type, raw) {
        Some(value) if validate(column_type, &value) => Ok(Some(value)),
        Some(_) => Err(rejected),
        None if raw.trim().is_empty() => Ok(None),
        None => Err(rejected),
    }
}

fn parse_verbatim(raw: &str) -> Option<CellValue> {
    Some(CellValue::text(raw))
}

fn parse_number(raw: &str) -> Option<CellValue> {
    coerce_str_number(raw).map(CellValue::Number)
}

fn parse_checkbox(raw: &str) -> Option<CellValue> {
    let checked = matches!(raw.trim(), "true" | "1" | "yes");
    Some(CellValue::Boolean(checked))
}

fn parse_list(raw: &str) -> Option<CellValue> {
    let parsed = serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .filter(serde_json::Value::is_array)
        .and_then(CellValue::from_json);
    Some(parsed.unwrap_or(CellValue::List(Vec::new())))
}

fn validate_string(value: &CellValue) -> bool {
    matches!(value, CellValue::Text(_))
}

fn validate_number(value: &CellValue) -> bool {
    matches!(value, CellValue::Number(n) if n.is_finite())
}

fn validate_checkbox(value: &CellValue) -> bool {
    matches!(value, CellValue::Boolean(_))
}

fn validate_list(value: &CellValue) -> bool {
    matches!(value, CellValue::List(_))
}

/// Check the `YYYY-MM-DD` shape (no calendar check)
pub fn is_date_string(s: &str) -> bool {
    regex_is_match!(r"^\d{4}-\d{2}-\d{2}$", s)
}

fn validate_date(value: &CellValue) -> bool {
    matches!(value, CellValue::Text(s) if is_date_string(s))
}

fn validate_url(value: &CellValue) -> bool {
    match value {
        CellValue::Text(s) if s.is_empty() => true,
        CellValue::Text(s) => url::Url::parse(s).is_ok(),
        _ => false,
    }
}
