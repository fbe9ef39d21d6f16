//! Display formatting for read paths

use std::fmt;

use crate::cell::CellValue;
use crate::column::{ColumnSettings, ColumnType, OptionColor};

/// Options controlling how values are rendered as text
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Links longer than this (in characters) are truncated for display
    pub link_display_chars: usize,
    /// Suffix appended to truncated link text
    pub ellipsis: String,
    /// Placeholder shown for empty cells
    pub empty_placeholder: String,
    /// Glyph for a checked checkbox
    pub checked_glyph: String,
    /// Glyph for an unchecked checkbox
    pub unchecked_glyph: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            link_display_chars: 30,
            ellipsis: "...".to_string(),
            empty_placeholder: "Empty".to_string(),
            checked_glyph: "✅".to_string(),
            unchecked_glyph: "☐".to_string(),
        }
    }
}

/// A select label rendered as a colored chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub label: String,
    pub color: OptionColor,
}

/// Display form of a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayValue {
    /// Empty cell placeholder (distinct from blank text)
    Empty,
    /// Two-state checkbox glyph
    Checkbox(bool),
    /// Select or multi-select labels
    Chips(Vec<Chip>),
    /// Clickable link; `text` may be truncated, `href` never is
    Link { href: String, text: String },
    /// Plain text
    Text(String),
}

impl DisplayValue {
    /// Render as plain text
    pub fn render(&self, options: &FormatOptions) -> String {
        match self {
            DisplayValue::Empty => options.empty_placeholder.clone(),
            DisplayValue::Checkbox(true) => options.checked_glyph.clone(),
            DisplayValue::Checkbox(false) => options.unchecked_glyph.clone(),
            DisplayValue::Chips(chips) => chips
                .iter()
                .map(|c| format!("[{}]", c.label))
                .collect::<Vec<_>>()
                .join(" "),
            DisplayValue::Link { text, .. } => text.clone(),
            DisplayValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&FormatOptions::default()))
    }
}

/// Format a decoded value for display
///
/// Values whose shape does not match the column type fall back to their
/// string form.
pub fn format(
    value: Option<&CellValue>,
    column_type: ColumnType,
    settings: Option<&ColumnSettings>,
    options: &FormatOptions,
) -> DisplayValue {
    let Some(value) = value else {
        return DisplayValue::Empty;
    };

    match (column_type, value) {
        (ColumnType::Checkbox, CellValue::Boolean(b)) => DisplayValue::Checkbox(*b),
        (ColumnType::Select, CellValue::Text(label)) => {
            if label.is_empty() {
                DisplayValue::Empty
            } else {
                DisplayValue::Chips(vec![chip(label, settings)])
            }
        }
        (ColumnType::MultiSelect, CellValue::List(labels)) => {
            if labels.is_empty() {
                DisplayValue::Empty
            } else {
                DisplayValue::Chips(labels.iter().map(|l| chip(l, settings)).collect())
            }
        }
        (ColumnType::Url, CellValue::Text(href)) if !href.is_empty() => DisplayValue::Link {
            href: href.clone(),
            text: truncate(href, options.link_display_chars, &options.ellipsis),
        },
        (_, CellValue::Text(s)) if s.is_empty() => DisplayValue::Empty,
        (_, other) => DisplayValue::Text(other.to_string()),
    }
}

fn chip(label: &str, settings: Option<&ColumnSettings>) -> Chip {
    Chip {
        label: label.to_string(),
        color: settings.map(|s| s.color_for(label)).unwrap_or_default(),
    }
}

fn truncate(text: &str, max_chars: usize, ellipsis: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(ellipsis);
    out
}
