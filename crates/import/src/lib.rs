//! Spreadsheet importers for the inventory entities.
//!
//! Each importer runs its rows through the `leasehold-core` validation
//! pipeline, resolving names against Postgres, and persists the valid rows
//! through the `leasehold-db` repositories.

pub mod config;
pub mod error;
pub mod importers;
pub mod report;

pub use importers::{import_rows, Entity};
pub use report::ImportOutcome;
