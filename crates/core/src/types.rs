/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A spreadsheet row's cells keyed by column header.
pub type RowData = serde_json::Map<String, serde_json::Value>;
