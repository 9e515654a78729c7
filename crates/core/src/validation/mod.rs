//! Field validation for spreadsheet rows.
//!
//! Declarative rule types, the validator registry and a pure evaluator. No
//! database dependencies.

pub mod evaluator;
pub mod lexical;
pub mod registry;
pub mod rules;

pub use evaluator::{get_field_value, validate_fields};
pub use rules::{FieldRule, FieldTarget, InvalidField, RowError, ValidationKind, ViolationKind};
