//! Pure logic for the spreadsheet inventory importer.
//!
//! Validation rules, prerequisite (foreign key) resolution over an abstract
//! lookup source, the row validation engine, value coercion helpers and the
//! per-entity rule tables. Nothing in this crate talks to a database.

pub mod dal_types;
pub mod error;
pub mod import;
pub mod inventory;
pub mod spreadsheet;
pub mod types;
pub mod validation;
