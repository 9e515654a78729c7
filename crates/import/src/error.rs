use leasehold_core::error::CoreError;
use leasehold_core::import::ImportError;

/// Application-level error type for the importers and the binary.
///
/// Row-level problems never surface here; they are reported in the
/// [`ImportOutcome`](crate::report::ImportOutcome). These variants abort a
/// whole import.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `leasehold_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The validation pipeline could not run the batch.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or malformed configuration or arguments.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for importer return values.
pub type AppResult<T> = Result<T, AppError>;
