//! Cell value types

use std::fmt;

use serde_json::Value as JsonValue;

/// Typed, in-memory value of a non-empty cell
///
/// The variants mirror the shapes a stored value can take rather than the
/// column types: select, url and date values are all `Text`. An empty cell is
/// represented by `Option::<CellValue>::None`, never by a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// String value (text, select, url and date columns)
    Text(String),

    /// Numeric value
    Number(f64),

    /// Boolean value (checkbox columns)
    Boolean(bool),

    /// List of labels (multi-select columns)
    List(Vec<String>),

    /// Structured content with no typed counterpart, such as an object or a
    /// list holding non-string entries. Never produced for shapes that map to
    /// one of the other variants.
    Json(JsonValue),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Create a new list value
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CellValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Map a JSON value onto the typed shapes; `null` maps to `None`
    pub fn from_json(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(b) => Some(CellValue::Boolean(b)),
            JsonValue::Number(n) => match n.as_f64() {
                Some(f) => Some(CellValue::Number(f)),
                None => Some(CellValue::Json(JsonValue::Number(n))),
            },
            JsonValue::String(s) => Some(CellValue::Text(s)),
            JsonValue::Array(items) => {
                if items.iter().all(JsonValue::is_string) {
                    let labels = items
                        .into_iter()
                        .filter_map(|v| match v {
                            JsonValue::String(s) => Some(s),
                            _ => None,
                        })
                        .collect();
                    Some(CellValue::List(labels))
                } else {
                    Some(CellValue::Json(JsonValue::Array(items)))
                }
            }
            other @ JsonValue::Object(_) => Some(CellValue::Json(other)),
        }
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::Text(s) => JsonValue::String(s.clone()),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            CellValue::Boolean(b) => JsonValue::Bool(*b),
            CellValue::List(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
            CellValue::Json(v) => v.clone(),
        }
    }

    /// Check if the value counts as empty for filtering
    ///
    /// Blank strings, `false` and empty lists are empty; absent cells are
    /// handled by the caller.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(s) => s.is_empty(),
            CellValue::Boolean(b) => !b,
            CellValue::List(items) => items.is_empty(),
            CellValue::Number(_) => false,
            CellValue::Json(v) => v.is_null(),
        }
    }

    /// Coerce to a number
    ///
    /// Booleans coerce to 1/0 and text is parsed after trimming. Blank text,
    /// lists, structured values and non-finite results yield `None`.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n).filter(|n| !n.is_nan()),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => coerce_str_number(s),
            CellValue::List(_) | CellValue::Json(_) => None,
        }
    }

    /// Coerce to a string, joining list entries with commas
    pub fn coerce_string(&self) -> String {
        match self {
            CellValue::List(items) => items.join(","),
            other => other.to_string(),
        }
    }

    /// Flattened text used by free-text search (list entries joined by spaces)
    pub fn search_text(&self) -> String {
        match self {
            CellValue::List(items) => items.join(" "),
            other => other.to_string(),
        }
    }
}

/// Parse a string as a finite number after trimming; blank input yields `None`
pub(crate) fn coerce_str_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::List(items) => write!(f, "{}", items.join(", ")),
            CellValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Vec<String>> for CellValue {
    fn from(items: Vec<String>) -> Self {
        CellValue::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_shapes() {
        assert_eq!(CellValue::from_json(json!(null)), None);
        assert_eq!(
            CellValue::from_json(json!(5)),
            Some(CellValue::Number(5.0))
        );
        assert_eq!(
            CellValue::from_json(json!(["Ops", "Tech"])),
            Some(CellValue::list(["Ops", "Tech"]))
        );
        assert_eq!(
            CellValue::from_json(json!(["Ops", 1])),
            Some(CellValue::Json(json!(["Ops", 1])))
        );
        assert_eq!(
            CellValue::from_json(json!({"a": 1})),
            Some(CellValue::Json(json!({"a": 1})))
        );
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(CellValue::Number(5.0).coerce_number(), Some(5.0));
        assert_eq!(CellValue::Boolean(true).coerce_number(), Some(1.0));
        assert_eq!(CellValue::text(" 3.5 ").coerce_number(), Some(3.5));
        assert_eq!(CellValue::text("2024-01-10").coerce_number(), None);
        assert_eq!(CellValue::text("").coerce_number(), None);
        assert_eq!(CellValue::text("NaN").coerce_number(), None);
        assert_eq!(CellValue::list(["1"]).coerce_number(), None);
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(CellValue::Number(5.0).coerce_string(), "5");
        assert_eq!(CellValue::Number(2.5).coerce_string(), "2.5");
        assert_eq!(CellValue::Boolean(true).coerce_string(), "true");
        assert_eq!(CellValue::list(["a", "b"]).coerce_string(), "a,b");
        assert_eq!(CellValue::list(["a", "b"]).search_text(), "a b");
    }

    #[test]
    fn test_is_blank() {
        assert!(CellValue::text("").is_blank());
        assert!(CellValue::Boolean(false).is_blank());
        assert!(CellValue::List(vec![]).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Boolean(true).is_blank());
    }
}
