//! Mapping of `sqlx` failures onto row-level import errors.

use leasehold_core::import::EntityError;
use sqlx::postgres::PgDatabaseError;

/// Convert a failed statement into an [`EntityError`].
///
/// Server-side errors keep the server message and the Postgres `DETAIL`
/// line, so unique violations report the conflicting key.
pub fn to_entity_error(error: sqlx::Error) -> EntityError {
    match &error {
        sqlx::Error::Database(db) => EntityError::Database {
            message: db.message().to_string(),
            detail: db
                .try_downcast_ref::<PgDatabaseError>()
                .and_then(PgDatabaseError::detail)
                .map(str::to_string),
        },
        _ => EntityError::Other(error.to_string()),
    }
}
