//! Column types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum length of a column name (in characters)
pub const MAX_COLUMN_NAME_LEN: usize = 100;

/// Opaque column identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    /// Wrap an identifier string
    pub fn new<S: Into<String>>(id: S) -> Self {
        ColumnId(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        ColumnId::new(s)
    }
}

impl From<String> for ColumnId {
    fn from(s: String) -> Self {
        ColumnId(s)
    }
}

/// The fixed set of column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Free text
    Text,
    /// Floating point number
    Number,
    /// One label out of the column's options
    Select,
    /// Any number of labels out of the column's options
    MultiSelect,
    /// Calendar date in `YYYY-MM-DD` form
    Date,
    /// Boolean
    Checkbox,
    /// Absolute URL
    Url,
}

impl ColumnType {
    /// All column types, in the order they are offered to users
    pub const ALL: [ColumnType; 7] = [
        ColumnType::Text,
        ColumnType::Number,
        ColumnType::Select,
        ColumnType::MultiSelect,
        ColumnType::Date,
        ColumnType::Checkbox,
        ColumnType::Url,
    ];

    /// Wire tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Select => "select",
            ColumnType::MultiSelect => "multi_select",
            ColumnType::Date => "date",
            ColumnType::Checkbox => "checkbox",
            ColumnType::Url => "url",
        }
    }

    /// Whether columns of this type carry a labeled option list
    pub fn uses_options(&self) -> bool {
        matches!(self, ColumnType::Select | ColumnType::MultiSelect)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ColumnType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| Error::UnknownColumnType(s.to_string()))
    }
}

/// Color tag for a select option
///
/// Unknown tags read from storage fall back to [`OptionColor::Gray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum OptionColor {
    #[default]
    Gray,
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Pink,
    Teal,
}

impl OptionColor {
    const ALL: [OptionColor; 9] = [
        OptionColor::Gray,
        OptionColor::Red,
        OptionColor::Blue,
        OptionColor::Green,
        OptionColor::Yellow,
        OptionColor::Orange,
        OptionColor::Purple,
        OptionColor::Pink,
        OptionColor::Teal,
    ];

    /// Get the color tag
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionColor::Gray => "gray",
            OptionColor::Red => "red",
            OptionColor::Blue => "blue",
            OptionColor::Green => "green",
            OptionColor::Yellow => "yellow",
            OptionColor::Orange => "orange",
            OptionColor::Purple => "purple",
            OptionColor::Pink => "pink",
            OptionColor::Teal => "teal",
        }
    }

    /// Parse a color tag (case-insensitive)
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        OptionColor::ALL.into_iter().find(|c| c.as_str() == tag)
    }
}

impl From<String> for OptionColor {
    fn from(tag: String) -> Self {
        OptionColor::from_tag(&tag).unwrap_or_default()
    }
}

impl fmt::Display for OptionColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled, colored option of a select or multi-select column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    #[serde(default)]
    pub color: OptionColor,
}

impl SelectOption {
    /// Create a new option
    pub fn new<S: Into<String>>(label: S, color: OptionColor) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// Column-type-specific configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSettings {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl ColumnSettings {
    /// Settings with an empty option list
    pub fn empty() -> Self {
        Self::default()
    }

    /// Settings with the given options
    pub fn with_options(options: Vec<SelectOption>) -> Self {
        Self { options }
    }

    /// Find the option whose label matches exactly
    pub fn option(&self, label: &str) -> Option<&SelectOption> {
        self.options.iter().find(|o| o.label == label)
    }

    /// Color for a label, or the neutral default if no option matches
    pub fn color_for(&self, label: &str) -> OptionColor {
        self.option(label).map(|o| o.color).unwrap_or_default()
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub column_type: ColumnType,
    /// Sort key; not guaranteed unique
    pub order_index: i64,
    /// Only meaningful for select and multi-select columns
    pub settings: Option<ColumnSettings>,
    /// Store-assigned creation sequence, used to break order ties
    pub created_seq: u64,
}

impl Column {
    /// Option list for this column (empty when the column carries no settings)
    pub fn options(&self) -> &[SelectOption] {
        self.settings
            .as_ref()
            .map(|s| s.options.as_slice())
            .unwrap_or(&[])
    }
}

/// Fields for a column that is about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewColumn {
    pub name: String,
    pub column_type: ColumnType,
    pub order_index: i64,
    pub settings: Option<ColumnSettings>,
}

/// Partial update of a column
///
/// `settings` is tri-state: `None` leaves settings alone, `Some(None)` clears
/// them and `Some(Some(s))` replaces them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPatch {
    pub name: Option<String>,
    pub column_type: Option<ColumnType>,
    pub order_index: Option<i64>,
    pub settings: Option<Option<ColumnSettings>>,
}

impl ColumnPatch {
    /// Check whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.column_type.is_none()
            && self.order_index.is_none()
            && self.settings.is_none()
    }

    /// Apply this patch to a column in place
    pub fn apply_to(&self, column: &mut Column) {
        if let Some(name) = &self.name {
            column.name = name.clone();
        }
        if let Some(column_type) = self.column_type {
            column.column_type = column_type;
        }
        if let Some(order_index) = self.order_index {
            column.order_index = order_index;
        }
        if let Some(settings) = &self.settings {
            column.settings = settings.clone();
        }
    }
}

/// Trim a column name and check its length
pub fn validate_column_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_COLUMN_NAME_LEN {
        return Err(Error::InvalidColumnName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_type_tags() {
        for t in ColumnType::ALL {
            assert_eq!(t.as_str().parse::<ColumnType>().unwrap(), t);
        }
        assert_eq!(
            "multi_select".parse::<ColumnType>().unwrap(),
            ColumnType::MultiSelect
        );
        assert!(matches!(
            "rating".parse::<ColumnType>(),
            Err(Error::UnknownColumnType(_))
        ));
    }

    #[test]
    fn test_column_type_serde_tag() {
        let json = serde_json::to_string(&ColumnType::MultiSelect).unwrap();
        assert_eq!(json, "\"multi_select\"");
    }

    #[test]
    fn test_unknown_color_falls_back_to_gray() {
        let opt: SelectOption =
            serde_json::from_str(r#"{"label":"Ops","color":"chartreuse"}"#).unwrap();
        assert_eq!(opt.color, OptionColor::Gray);

        let opt: SelectOption = serde_json::from_str(r#"{"label":"Ops","color":"Teal"}"#).unwrap();
        assert_eq!(opt.color, OptionColor::Teal);
    }

    #[test]
    fn test_settings_color_for() {
        let settings = ColumnSettings::with_options(vec![
            SelectOption::new("Done", OptionColor::Green),
            SelectOption::new("Blocked", OptionColor::Red),
        ]);
        assert_eq!(settings.color_for("Blocked"), OptionColor::Red);
        assert_eq!(settings.color_for("Archived"), OptionColor::Gray);
    }

    #[test]
    fn test_validate_column_name() {
        assert_eq!(validate_column_name("  Status ").unwrap(), "Status");
        assert!(validate_column_name("   ").is_err());
        assert!(validate_column_name(&"x".repeat(101)).is_err());
        assert!(validate_column_name(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_patch_apply() {
        let mut column = Column {
            id: ColumnId::new("c1"),
            name: "Tags".into(),
            column_type: ColumnType::MultiSelect,
            order_index: 3,
            settings: Some(ColumnSettings::empty()),
            created_seq: 1,
        };
        let patch = ColumnPatch {
            column_type: Some(ColumnType::Text),
            settings: Some(None),
            ..Default::default()
        };
        patch.apply_to(&mut column);
        assert_eq!(column.column_type, ColumnType::Text);
        assert_eq!(column.settings, None);
        assert_eq!(column.name, "Tags");
    }
}
