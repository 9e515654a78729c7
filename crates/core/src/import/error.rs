use serde_json::Value;

use crate::types::RowData;
use crate::validation::rules::{InvalidField, ViolationKind};

const DUPLICATE_KEY: &str = "duplicate key";

/// Failures that abort a whole import batch before or outside row handling.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// A related prerequisite names a field no standalone prerequisite owns.
    #[error("REFERRING_INVALID_RELATED_PREREQUISITE: {field}")]
    InvalidRelatedPrerequisite { field: String },

    #[error("Lookup failed for column {column}: {message}")]
    Lookup { column: String, message: String },

    #[error("Spreadsheet check failed: {0}")]
    SpreadsheetCheck(String),
}

/// A failure raised while checking or persisting a single row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntityError {
    /// The database rejected a statement. `detail` carries the server's
    /// diagnostic detail when there is one.
    #[error("{message}")]
    Database {
        message: String,
        detail: Option<String>,
    },

    #[error("{0}")]
    Other(String),
}

impl EntityError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Report this failure against the row that raised it.
    ///
    /// Unique-constraint violations keep the constraint text (from
    /// "duplicate key" onwards) as the name and the database detail as the
    /// message. Anything else is reported with the offending row attached.
    pub fn into_invalid_field(self, data: &RowData) -> InvalidField {
        let text = self.to_string();
        if let Some(position) = text.find(DUPLICATE_KEY) {
            let detail = match &self {
                EntityError::Database { detail, .. } => detail.clone().unwrap_or_default(),
                EntityError::Other(_) => String::new(),
            };
            return InvalidField::new(&text[position..], detail, ViolationKind::DuplicateKey);
        }

        let element = serde_json::to_string(&Value::Object(data.clone())).unwrap_or_default();
        InvalidField::new(
            text.clone(),
            format!("{text} - Element: {element}"),
            ViolationKind::Unexpected,
        )
    }
}
