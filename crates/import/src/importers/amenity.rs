//! Amenities sheet importer.

use async_trait::async_trait;
use leasehold_core::dal_types::{AMENITY_CATEGORY, AMENITY_SUB_CATEGORY};
use leasehold_core::import::coercion::{
    date_to_persist, flag_or_false, number_to_persist, text_to_persist,
};
use leasehold_core::import::{validate, EntityError, ImportHandler};
use leasehold_core::inventory::{amenity, text};
use leasehold_core::spreadsheet::AMENITIES;
use leasehold_core::types::RowData;
use leasehold_core::validation::InvalidField;
use leasehold_db::error::to_entity_error;
use leasehold_db::models::amenity::{Amenity, CreateAmenity};
use leasehold_db::repositories::{AmenityRepo, PgLookupSource};
use leasehold_db::DbPool;

use super::{catalog_value, required_id, sheet_rows};
use crate::error::AppResult;
use crate::report::ImportOutcome;

struct AmenityHandler<'a> {
    pool: &'a DbPool,
    saved: Vec<Amenity>,
}

fn to_create(data: &RowData) -> Result<CreateAmenity, EntityError> {
    Ok(CreateAmenity {
        property_id: required_id(data, "property_id")?,
        name: text(data, "name"),
        category: catalog_value(data, "category", &AMENITY_CATEGORY).unwrap_or_default(),
        sub_category: catalog_value(data, "subCategory", &AMENITY_SUB_CATEGORY),
        display_name: text(data, "displayName"),
        description: text_to_persist(data.get("description")),
        high_value: flag_or_false(data.get("highValueFlag")),
        relative_price: number_to_persist(data.get("relativePrice")),
        absolute_price: number_to_persist(data.get("absolutePrice")),
        target_unit: flag_or_false(data.get("targetUnitFlag")),
        hidden: flag_or_false(data.get("hiddenFlag")),
        external_id: text_to_persist(data.get("externalId")),
        end_date: date_to_persist(data.get("endDate")),
    })
}

#[async_trait]
impl ImportHandler for AmenityHandler<'_> {
    async fn custom_check(
        &mut self,
        data: &mut RowData,
        _index: usize,
    ) -> Result<Vec<InvalidField>, EntityError> {
        Ok(amenity::additional_validations(data))
    }

    async fn on_valid_entity(&mut self, data: &RowData, _index: usize) -> Result<(), EntityError> {
        let amenity = AmenityRepo::upsert(self.pool, &to_create(data)?)
            .await
            .map_err(to_entity_error)?;
        self.saved.push(amenity);
        Ok(())
    }
}

/// Upsert amenities on property, category and name.
pub async fn import_amenities(pool: &DbPool, rows: Vec<RowData>) -> AppResult<ImportOutcome> {
    let rows = sheet_rows(rows, &AMENITIES);
    let source = PgLookupSource::new(pool.clone());
    let mut handler = AmenityHandler {
        pool,
        saved: Vec::new(),
    };

    let invalid_fields = validate(rows, &amenity::RULES, &source, &mut handler, Some(&AMENITIES)).await?;
    Ok(ImportOutcome::new(invalid_fields, &handler.saved)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_map_to_upsert_input() {
        let data: RowData = [
            ("name", json!(" Pool ")),
            ("property_id", json!(3)),
            ("category", json!("BUILDING")),
            ("subCategory", json!("LIVING_SPACE")),
            ("displayName", json!("Pool")),
            ("highValueFlag", json!(true)),
            ("relativePrice", json!(5)),
            ("absolutePrice", json!("")),
            ("endDate", json!("12/31/2026")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let input = to_create(&data).unwrap();
        assert_eq!(input.property_id, 3);
        assert_eq!(input.name, "Pool");
        assert_eq!(input.category, "building");
        assert_eq!(input.sub_category.as_deref(), Some("livingSpace"));
        assert!(input.high_value);
        assert!(!input.hidden);
        assert_eq!(input.relative_price, Some(5.0));
        assert_eq!(input.absolute_price, None);
        assert_eq!(input.end_date, chrono::NaiveDate::from_ymd_opt(2026, 12, 31));
    }

    #[test]
    fn unresolved_property_is_an_error() {
        assert!(to_create(&RowData::new()).is_err());
    }
}
