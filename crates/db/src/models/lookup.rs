//! Rows returned by prerequisite lookups.

use leasehold_core::import::LookupRow;
use leasehold_core::types::DbId;
use sqlx::FromRow;

/// A matched row: its id, the compared column as text and, for grouped
/// lookups, the id it was scoped by.
#[derive(Debug, Clone, FromRow)]
pub struct LookupRecord {
    pub id: DbId,
    pub value: String,
    pub related_id: Option<DbId>,
}

impl From<LookupRecord> for LookupRow {
    fn from(record: LookupRecord) -> Self {
        match record.related_id {
            Some(related_id) => LookupRow::related(record.id, record.value, related_id),
            None => LookupRow::new(record.id, record.value),
        }
    }
}
