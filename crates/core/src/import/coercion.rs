//! Coercion of spreadsheet cells into values ready to persist.

use serde_json::Value;

use chrono::NaiveDate;

use crate::dal_types::EnumMapping;
use crate::validation::lexical::{cell_text, is_blank, to_number, SIMPLE_DATE_US_FORMAT};

pub use crate::validation::lexical::try_parse_as_date;

/// Canonical enum value for a cell, compared trimmed and case-insensitively
/// against the mapping's values (never its keys).
pub fn get_value_from_enum(mapping: &EnumMapping, raw: Option<&Value>) -> Option<&'static str> {
    mapping.canonical(&cell_text(raw))
}

/// Numbers pass through; text is trimmed and returned when non-empty.
/// Anything blank becomes `default`.
///
/// Pass `Value::Null` as the default when an empty cell should persist as
/// SQL `NULL` instead of zero.
pub fn get_value_to_persist(value: Option<&Value>, default: Value) -> Value {
    match value {
        Some(Value::Number(n)) => Value::Number(n.clone()),
        other => {
            let text = cell_text(other);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                default
            } else {
                Value::String(trimmed.to_string())
            }
        }
    }
}

/// Text to persist for an optional column; blank cells become `None`.
pub fn text_to_persist(value: Option<&Value>) -> Option<String> {
    match get_value_to_persist(value, Value::Null) {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a flag cell.
///
/// `x`/`true` are set and `""`/`false` are unset, in any case. Any other
/// text is ambiguous and yields `None`, as does a missing cell. Booleans pass
/// through and the numbers 1 and 0 map to set and unset.
pub fn translate_flag_cell_value(value: Option<&Value>) -> Option<bool> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(true),
            Some(f) if f == 0.0 => Some(false),
            _ => None,
        },
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "x" | "true" => Some(true),
            "" | "false" => Some(false),
            _ => None,
        },
        Some(_) => None,
    }
}

/// Flag value that defaults to unset when the cell is missing or ambiguous.
pub fn flag_or_false(value: Option<&Value>) -> bool {
    translate_flag_cell_value(value).unwrap_or(false)
}

/// Split on unescaped commas. `\,` is a literal comma in the output.
/// Elements are trimmed, empty ones dropped, and order is kept. Missing input
/// yields an empty list.
pub fn trim_and_split_by_comma(value: Option<&str>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };

    let mut elements = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => elements.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    elements.push(current);

    elements
        .into_iter()
        .map(|element| element.trim().to_string())
        .filter(|element| !element.is_empty())
        .collect()
}

/// [`trim_and_split_by_comma`] over a cell of any type.
pub fn split_cell_by_comma(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .flat_map(|item| trim_and_split_by_comma(Some(&cell_text(Some(item)))))
            .collect(),
        other => trim_and_split_by_comma(Some(&cell_text(other))),
    }
}

/// Split on commas, trim, drop empty elements and keep the first occurrence
/// of each value.
pub fn convert_string_value_to_array(value: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    value
        .split(',')
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .filter(|element| seen.insert(element.to_string()))
        .map(str::to_string)
        .collect()
}

pub fn split_by_symbol(value: &str, symbol: char) -> Vec<String> {
    value.split(symbol).map(|part| part.trim().to_string()).collect()
}

/// Whether every comma-separated element matches a key or value of the
/// mapping, ignoring case.
pub fn exists_in(valid_values: &EnumMapping, value: &str) -> bool {
    split_by_symbol(value, ',')
        .iter()
        .all(|element| valid_values.contains(element))
}

pub fn is_valid_minimum_value(value: f64, min_value: f64) -> bool {
    value >= min_value
}

/// Number to persist for an optional numeric column; blank or unparseable
/// cells become `None`.
pub fn number_to_persist(value: Option<&Value>) -> Option<f64> {
    if is_blank(value) {
        return None;
    }
    to_number(value).filter(|n| n.is_finite())
}

/// A US `month/day/year` cell as a date.
pub fn date_to_persist(value: Option<&Value>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell_text(value).trim(), SIMPLE_DATE_US_FORMAT).ok()
}
