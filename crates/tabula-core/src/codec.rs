//! Value codec
//!
//! Converts between typed cell values and the storage form (JSON text).
//! Decoding never fails: malformed content is logged and read as empty, so a
//! corrupt or out-of-date cell cannot break a read path.

use serde_json::Value as JsonValue;

use crate::cell::{CellValue, StorageForm};
use crate::column::{ColumnSettings, ColumnType};
use crate::error::{Error, Result};

/// Encode a value for storage
///
/// `None` encodes to [`StorageForm::Empty`], never to the type's zero value.
pub fn encode(value: Option<&CellValue>) -> StorageForm {
    match value.map(CellValue::to_json) {
        None | Some(JsonValue::Null) => StorageForm::Empty,
        Some(json) => StorageForm::Serialized(json.to_string()),
    }
}

/// Decode a stored value, reporting malformed content as an error
pub fn try_decode(stored: &StorageForm) -> Result<Option<CellValue>> {
    match stored.as_deref() {
        None => Ok(None),
        Some(text) => serde_json::from_str::<JsonValue>(text)
            .map(CellValue::from_json)
            .map_err(|e| Error::MalformedStorage(format!("{e} in {text:?}"))),
    }
}

/// Decode a stored value for a column of `expected` type
///
/// The value is not re-validated against `expected`; a value of the wrong
/// shape still decodes and the formatter falls back to its string form.
/// Malformed content reads as empty.
pub fn decode(stored: &StorageForm, expected: ColumnType) -> Option<CellValue> {
    match try_decode(stored) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Treating {expected} cell as empty: {e}");
            None
        }
    }
}

/// Encode column settings for storage
pub fn encode_settings(settings: Option<&ColumnSettings>) -> Option<String> {
    // Serializing a plain struct of strings cannot fail
    settings.and_then(|s| serde_json::to_string(s).ok())
}

/// Parse settings JSON supplied by a user edit
pub fn parse_settings(text: &str) -> Result<Option<ColumnSettings>> {
    serde_json::from_str::<Option<ColumnSettings>>(text)
        .map_err(|e| Error::MalformedStorage(format!("settings: {e}")))
}

/// Decode stored column settings; malformed content reads as no settings
pub fn decode_settings(stored: Option<&str>) -> Option<ColumnSettings> {
    let text = stored?;
    match parse_settings(text) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Ignoring column settings: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{OptionColor, SelectOption};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_null_is_empty_marker() {
        assert_eq!(encode(None), StorageForm::Empty);
        assert_eq!(encode(Some(&CellValue::Number(f64::NAN))), StorageForm::Empty);
    }

    #[test]
    fn test_encode_is_json_text() {
        assert_eq!(
            encode(Some(&CellValue::text("Done"))),
            StorageForm::serialized("\"Done\"")
        );
        assert_eq!(
            encode(Some(&CellValue::list(["Ops", "Tech"]))),
            StorageForm::serialized(r#"["Ops","Tech"]"#)
        );
        assert_eq!(
            encode(Some(&CellValue::Boolean(false))),
            StorageForm::serialized("false")
        );
    }

    #[test]
    fn test_decode_integer_text() {
        assert_eq!(
            decode(&StorageForm::serialized("5"), ColumnType::Number),
            Some(CellValue::Number(5.0))
        );
    }

    #[test]
    fn test_decode_malformed_is_empty() {
        let stored = StorageForm::serialized("{not json");
        assert_eq!(decode(&stored, ColumnType::Text), None);
        assert!(matches!(
            try_decode(&stored),
            Err(Error::MalformedStorage(_))
        ));
    }

    #[test]
    fn test_decode_does_not_revalidate() {
        // A list left behind after a multi-select column became text
        let stored = StorageForm::serialized(r#"["Ops"]"#);
        assert_eq!(
            decode(&stored, ColumnType::Text),
            Some(CellValue::list(["Ops"]))
        );
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = ColumnSettings::with_options(vec![
            SelectOption::new("Low", OptionColor::Gray),
            SelectOption::new("Urgent", OptionColor::Red),
        ]);
        let text = encode_settings(Some(&settings)).unwrap();
        assert_eq!(decode_settings(Some(&text)), Some(settings));
        assert_eq!(encode_settings(None), None);
    }

    #[test]
    fn test_decode_settings_tolerant() {
        assert_eq!(decode_settings(None), None);
        assert_eq!(decode_settings(Some("null")), None);
        assert_eq!(decode_settings(Some("{oops")), None);
        assert_eq!(
            decode_settings(Some("{}")),
            Some(ColumnSettings::empty())
        );
    }
}
