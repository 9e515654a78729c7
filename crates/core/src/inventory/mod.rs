//! Per-entity rule tables and pure domain checks for the inventory sheets.
//!
//! Each submodule declares the field rules and prerequisites handed to
//! [`crate::import::validate`], plus the row-level checks an importer runs from
//! its `custom_check` hook. Anything that needs the database lives in the
//! importer crate.

pub mod amenity;
pub mod campaign;
pub mod column_length;
pub mod concession;
pub mod fee;
pub mod program;

use serde_json::Value;

use crate::types::RowData;
use crate::validation::evaluator::get_field_value;
use crate::validation::lexical::{cell_text, is_blank};

/// Whether a cell holds a meaningful value.
///
/// Missing, `null`, blank text, `false` and zero all count as unset.
pub fn is_set(data: &RowData, field: &str) -> bool {
    match get_field_value(data, field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        value => !is_blank(value),
    }
}

/// Trimmed text of a cell; empty when the cell is missing or blank.
pub fn text(data: &RowData, field: &str) -> String {
    cell_text(get_field_value(data, field)).trim().to_string()
}
