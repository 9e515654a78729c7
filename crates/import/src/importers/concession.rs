//! Concessions sheet importer.
//!
//! `appliedToFees` names are resolved against the fees of the row's
//! property during `custom_check`, before the property id is filled in, so
//! the fee lists are cached by property name.

use std::collections::HashMap;

use async_trait::async_trait;
use leasehold_core::dal_types::{LEASE_STATE, NON_RECURRING_APPLIED};
use leasehold_core::import::coercion::{
    date_to_persist, flag_or_false, number_to_persist, split_cell_by_comma, text_to_persist,
};
use leasehold_core::import::{validate, EntityError, ImportHandler};
use leasehold_core::inventory::concession::{self, APPLIED_TO_FEES_FIELD};
use leasehold_core::inventory::fee::{resolve_fee_names, PropertyFee};
use leasehold_core::inventory::text;
use leasehold_core::spreadsheet::CONCESSIONS;
use leasehold_core::types::{DbId, RowData};
use leasehold_core::validation::rules::INVALID_MAX_VALUE;
use leasehold_core::validation::InvalidField;
use leasehold_db::error::to_entity_error;
use leasehold_db::models::concession::{Concession, CreateConcession};
use leasehold_db::repositories::{ConcessionRepo, FeeRepo, PgLookupSource};
use leasehold_db::DbPool;

use super::{catalog_value, required_id, sheet_rows};
use crate::error::AppResult;
use crate::report::ImportOutcome;

struct ConcessionHandler<'a> {
    pool: &'a DbPool,
    /// Fees keyed by lowercased property name.
    fees_by_property: HashMap<String, Vec<PropertyFee>>,
    /// Applied fee ids keyed by row index.
    applied_fees: HashMap<usize, Vec<DbId>>,
    saved: Vec<Concession>,
}

impl ConcessionHandler<'_> {
    async fn property_fees(&mut self, property: &str) -> Result<&[PropertyFee], EntityError> {
        let key = property.trim().to_lowercase();
        if !self.fees_by_property.contains_key(&key) {
            let fees = FeeRepo::list_summaries_by_property_name(self.pool, property)
                .await
                .map_err(to_entity_error)?;
            self.fees_by_property
                .insert(key.clone(), fees.into_iter().map(PropertyFee::from).collect());
        }
        Ok(self.fees_by_property.get(&key).map(Vec::as_slice).unwrap_or_default())
    }
}

/// Integer columns stored as `INTEGER`.
const WHOLE_NUMBER_FIELDS: &[&str] = &["recurringCount", "account", "subAccount"];

fn whole_number(data: &RowData, field: &str) -> Result<Option<i32>, InvalidField> {
    let Some(n) = number_to_persist(data.get(field)) else {
        return Ok(None);
    };
    i32::try_from(n.round() as i64)
        .map(Some)
        .map_err(|_| InvalidField::custom(field, INVALID_MAX_VALUE))
}

fn whole_number_errors(data: &RowData) -> Vec<InvalidField> {
    WHOLE_NUMBER_FIELDS
        .iter()
        .filter_map(|field| whole_number(data, field).err())
        .collect()
}

fn stored_whole_number(data: &RowData, field: &str) -> Result<Option<i32>, EntityError> {
    whole_number(data, field).map_err(|invalid| EntityError::other(format!("{field}: {}", invalid.message)))
}

fn to_create(data: &RowData) -> Result<CreateConcession, EntityError> {
    Ok(CreateConcession {
        property_id: required_id(data, "property_id")?,
        name: text(data, "name"),
        display_name: text(data, "displayName"),
        relative_adjustment: number_to_persist(data.get("relativeAdjustment")),
        absolute_adjustment: number_to_persist(data.get("absoluteAdjustment")),
        relative_default_adjustment: number_to_persist(data.get("relativeDefaultAdjustment")),
        absolute_default_adjustment: number_to_persist(data.get("absoluteDefaultAdjustment")),
        adjustment_floor_ceiling: text_to_persist(data.get("adjustmentFloorCeiling")),
        variable_adjustment: flag_or_false(data.get("variableAdjustmentFlag")),
        optional: flag_or_false(data.get("optionalFlag")),
        exclude_from_rent: flag_or_false(data.get("excludeFromRentFlag")),
        hide_in_self_service: flag_or_false(data.get("hideInSelfServiceFlag")),
        recurring: flag_or_false(data.get("recurringFlag")),
        recurring_count: stored_whole_number(data, "recurringCount")?,
        non_recurring_applied_at: catalog_value(data, "nonRecurringAppliedAt", &NON_RECURRING_APPLIED),
        lease_state: catalog_value(data, "leaseState", &LEASE_STATE),
        matching_criteria: concession::matching_criteria(data),
        start_date: date_to_persist(data.get("startDate")),
        end_date: date_to_persist(data.get("endDate")),
        account: stored_whole_number(data, "account")?,
        sub_account: stored_whole_number(data, "subAccount")?,
        taxable: flag_or_false(data.get("taxableFlag")),
        external_charge_code: text_to_persist(data.get("externalChargeCode")),
        baked_into_applied_fee: flag_or_false(data.get("bakedIntoAppliedFeeFlag")),
    })
}

#[async_trait]
impl ImportHandler for ConcessionHandler<'_> {
    async fn custom_check(
        &mut self,
        data: &mut RowData,
        index: usize,
    ) -> Result<Vec<InvalidField>, EntityError> {
        let mut invalid = concession::additional_validations(data);
        invalid.extend(whole_number_errors(data));

        let names = split_cell_by_comma(data.get(APPLIED_TO_FEES_FIELD));
        let property = text(data, "property");
        let resolved = resolve_fee_names(APPLIED_TO_FEES_FIELD, &names, self.property_fees(&property).await?);
        invalid.extend(resolved.invalid);
        if invalid.is_empty() {
            self.applied_fees.insert(index, resolved.ids);
        } else {
            self.applied_fees.remove(&index);
        }
        Ok(invalid)
    }

    async fn on_valid_entity(&mut self, data: &RowData, index: usize) -> Result<(), EntityError> {
        let fee_ids = self.applied_fees.remove(&index).unwrap_or_default();
        let concession = ConcessionRepo::upsert_with_fees(self.pool, &to_create(data)?, &fee_ids)
            .await
            .map_err(to_entity_error)?;
        tracing::debug!(index, concession_id = concession.id, fees = fee_ids.len(), "Concession saved");
        self.saved.push(concession);
        Ok(())
    }
}

/// Upsert concessions on property and name, replacing their applied fees.
pub async fn import_concessions(pool: &DbPool, rows: Vec<RowData>) -> AppResult<ImportOutcome> {
    let rows = sheet_rows(rows, &CONCESSIONS);
    let source = PgLookupSource::new(pool.clone());
    let mut handler = ConcessionHandler {
        pool,
        fees_by_property: HashMap::new(),
        applied_fees: HashMap::new(),
        saved: Vec::new(),
    };

    let invalid_fields =
        validate(rows, &concession::RULES, &source, &mut handler, Some(&CONCESSIONS)).await?;
    Ok(ImportOutcome::new(invalid_fields, &handler.saved)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn row(pairs: &[(&str, Value)]) -> RowData {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn rows_map_to_upsert_input() {
        let data = row(&[
            ("name", json!("Look and lease")),
            ("property_id", json!(2)),
            ("displayName", json!("Look and lease")),
            ("absoluteAdjustment", json!(-100)),
            ("recurringFlag", json!(true)),
            ("recurringCount", json!(3.0)),
            ("leaseState", json!("New")),
            ("layouts", json!("Studio, 1 Bed")),
            ("startDate", json!("01/15/2026")),
            ("subAccount", json!("")),
        ]);

        let input = to_create(&data).unwrap();
        assert_eq!(input.property_id, 2);
        assert_eq!(input.absolute_adjustment, Some(-100.0));
        assert!(input.recurring);
        assert_eq!(input.recurring_count, Some(3));
        assert_eq!(input.lease_state.as_deref(), Some("new"));
        assert_eq!(input.matching_criteria, Some(json!({"layouts": ["Studio", "1 Bed"]})));
        assert_eq!(input.start_date, chrono::NaiveDate::from_ymd_opt(2026, 1, 15));
        assert_eq!(input.sub_account, None);
    }

    #[test]
    fn whole_numbers_must_fit_an_integer_column() {
        let data = row(&[
            ("recurringCount", json!(2.6)),
            ("account", json!(1e12)),
            ("subAccount", json!(-3e10)),
        ]);
        assert_eq!(whole_number(&data, "recurringCount"), Ok(Some(3)));
        assert_eq!(
            whole_number_errors(&data),
            vec![
                InvalidField::custom("account", INVALID_MAX_VALUE),
                InvalidField::custom("subAccount", INVALID_MAX_VALUE),
            ]
        );

        let mut data = data;
        data.insert("property_id".to_string(), json!(2));
        assert!(to_create(&data).is_err());
    }

    #[sqlx::test(migrations = "../../db/migrations")]
    async fn vetoed_rows_keep_no_applied_fees(pool: sqlx::PgPool) {
        let mut handler = ConcessionHandler {
            pool: &pool,
            fees_by_property: HashMap::new(),
            applied_fees: HashMap::new(),
            saved: Vec::new(),
        };
        let mut data = row(&[
            ("name", json!("Promo")),
            ("property", json!("Parkmerced")),
            ("appliedToFees", json!("Parking")),
        ]);

        let invalid = handler.custom_check(&mut data, 2).await.unwrap();
        assert!(!invalid.is_empty());
        assert!(handler.applied_fees.is_empty());
    }

    #[test]
    fn unresolved_property_is_an_error() {
        assert!(to_create(&row(&[("name", json!("Promo"))])).is_err());
    }
}
