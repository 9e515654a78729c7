//! One importer per inventory sheet.
//!
//! An importer numbers and type-coerces the parsed rows, runs them through
//! [`leasehold_core::import::validate`] with the sheet's rule table and a
//! [`PgLookupSource`](leasehold_db::repositories::PgLookupSource), and
//! persists valid rows from its `ImportHandler`.

pub mod amenity;
pub mod campaign;
pub mod concession;
pub mod fee;
pub mod program;

use std::fmt;
use std::str::FromStr;

use leasehold_core::dal_types::EnumMapping;
use leasehold_core::import::coercion::{get_value_from_enum, text_to_persist};
use leasehold_core::import::{EntityError, Row};
use leasehold_core::spreadsheet::{self, convert_entities_in_an_expected_type, SheetSchema};
use leasehold_core::types::{DbId, RowData};
use leasehold_db::DbPool;
use serde_json::Value;

use crate::config::ImportConfig;
use crate::error::{AppError, AppResult};
use crate::report::ImportOutcome;

/// The sheets that can be imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Amenity,
    Campaign,
    Concession,
    Fee,
    Program,
}

impl Entity {
    pub fn schema(&self) -> &'static SheetSchema {
        match self {
            Entity::Amenity => &spreadsheet::AMENITIES,
            Entity::Campaign => &spreadsheet::CAMPAIGNS,
            Entity::Concession => &spreadsheet::CONCESSIONS,
            Entity::Fee => &spreadsheet::FEES,
            Entity::Program => &spreadsheet::PROGRAMS,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema().workbook_sheet_name)
    }
}

impl FromStr for Entity {
    type Err = AppError;

    /// Accepts the entity name or its sheet name, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amenity" | "amenities" => Ok(Entity::Amenity),
            "campaign" | "campaigns" => Ok(Entity::Campaign),
            "concession" | "concessions" => Ok(Entity::Concession),
            "fee" | "fees" => Ok(Entity::Fee),
            "program" | "programs" => Ok(Entity::Program),
            other => Err(AppError::Config(format!("Unknown entity: {other}"))),
        }
    }
}

/// Settings shared by every importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Rows per bulk upsert transaction.
    pub upsert_chunk_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            upsert_chunk_size: 1000,
        }
    }
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            upsert_chunk_size: config.upsert_chunk_size,
        }
    }
}

/// Import the parsed rows of one sheet.
pub async fn import_rows(
    pool: &DbPool,
    entity: Entity,
    rows: Vec<RowData>,
    options: ImportOptions,
) -> AppResult<ImportOutcome> {
    let total = rows.len();
    let outcome = match entity {
        Entity::Amenity => amenity::import_amenities(pool, rows).await?,
        Entity::Campaign => campaign::import_campaigns(pool, rows).await?,
        Entity::Concession => concession::import_concessions(pool, rows).await?,
        Entity::Fee => fee::import_fees(pool, rows, options).await?,
        Entity::Program => program::import_programs(pool, rows).await?,
    };

    tracing::info!(
        sheet = %entity,
        rows = total,
        invalid = outcome.invalid_fields.len(),
        persisted = outcome.valid_fields.len(),
        "Import finished",
    );
    Ok(outcome)
}

/// Number rows by sheet line and coerce cells to the schema's types.
pub(crate) fn sheet_rows(rows: Vec<RowData>, schema: &SheetSchema) -> Vec<Row> {
    convert_entities_in_an_expected_type(Row::from_sheet(rows), Some(schema))
}

/// Id a prerequisite wrote into the row, if it resolved.
pub(crate) fn resolved_id(data: &RowData, key: &str) -> Option<DbId> {
    data.get(key).and_then(Value::as_i64)
}

/// Canonical catalog value, or the trimmed cell text when nothing matched.
pub(crate) fn catalog_value(data: &RowData, field: &str, mapping: &EnumMapping) -> Option<String> {
    get_value_from_enum(mapping, data.get(field))
        .map(str::to_string)
        .or_else(|| text_to_persist(data.get(field)))
}

pub(crate) fn required_id(data: &RowData, key: &str) -> Result<DbId, EntityError> {
    resolved_id(data, key).ok_or_else(|| EntityError::other(format!("Missing resolved id: {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn entities_parse_from_names_and_sheets() {
        assert_eq!("fee".parse::<Entity>().unwrap(), Entity::Fee);
        assert_eq!(" Programs ".parse::<Entity>().unwrap(), Entity::Program);
        assert_matches!("layouts".parse::<Entity>(), Err(AppError::Config(_)));
        assert_eq!(Entity::Concession.to_string(), "Concessions");
    }

    #[test]
    fn sheet_rows_are_numbered_and_coerced() {
        let data: RowData = [("relativePrice".to_string(), json!("12.5"))].into_iter().collect();
        let rows = sheet_rows(vec![RowData::new(), data], &spreadsheet::AMENITIES);
        assert_eq!(rows[1].index, 3);
        assert_eq!(rows[1].data["relativePrice"], json!(12.5));
    }

    #[test]
    fn resolved_ids_are_read_back() {
        let data: RowData = [
            ("property_id".to_string(), json!(7)),
            ("campaign_id".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();
        assert_eq!(resolved_id(&data, "property_id"), Some(7));
        assert_eq!(resolved_id(&data, "campaign_id"), None);
        assert!(required_id(&data, "campaign_id").is_err());
    }
}
