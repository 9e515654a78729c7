//! Spreadsheet import pipeline.
//!
//! Bulk prerequisite resolution over an abstract [`LookupSource`], the row
//! validation engine and the coercion helpers importers use to turn cells
//! into persisted values.

pub mod coercion;
pub mod error;
pub mod pipeline;
pub mod prerequisite;
pub mod row;

pub use error::{EntityError, ImportError};
pub use pipeline::{validate, validate_and_process, ImportHandler, ImportRules};
pub use prerequisite::{LookupRow, LookupSource, Prerequisite, RelatedIds};
pub use row::{Row, FIRST_DATA_ROW};
