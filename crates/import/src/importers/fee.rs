//! Fees sheet importer.
//!
//! Valid rows are collected during validation and written afterwards: the
//! fees are de-duplicated (last row wins), bulk upserted, and only then are
//! the related and additional fee names resolved, since a row may name a fee
//! defined further down the sheet.

use std::collections::HashMap;

use async_trait::async_trait;
use leasehold_core::dal_types::{FEE_LEASE_STATE, QUOTE_SECTION};
use leasehold_core::import::coercion::{flag_or_false, number_to_persist, text_to_persist};
use leasehold_core::import::{validate, EntityError, ImportHandler};
use leasehold_core::inventory::fee::{
    self, associated_names, cycle_error, dedupe_last_wins, enum_to_persist, find_association_cycle,
    resolve_fee_names, service_period_to_persist, validate_duplicated_associations,
    validate_inventory_group_children, AssociationGraph, PropertyFee, ADDITIONAL_FEES_FIELD,
    EXTERNAL_FIELDS, RELATED_FEES_FIELD,
};
use leasehold_core::inventory::text;
use leasehold_core::spreadsheet::FEES;
use leasehold_core::types::{DbId, RowData};
use leasehold_core::validation::{InvalidField, RowError};
use leasehold_db::models::fee::{CreateFee, Fee, FeeAssociations};
use leasehold_db::repositories::{FeeRepo, PgLookupSource};
use leasehold_db::DbPool;
use serde_json::{Map, Value};

use super::{required_id, sheet_rows, ImportOptions};
use crate::error::AppResult;
use crate::report::ImportOutcome;

/// A validated fee row waiting to be written.
#[derive(Debug, Clone)]
struct PendingFee {
    index: usize,
    input: CreateFee,
    related: Vec<String>,
    additional: Vec<String>,
}

struct FeeHandler {
    /// Every row of the sheet, for checks that look at other rows.
    sheet: Vec<RowData>,
    pending: Vec<PendingFee>,
}

fn to_create(data: &RowData) -> Result<CreateFee, EntityError> {
    let external_accounts: Map<String, Value> = EXTERNAL_FIELDS
        .iter()
        .filter_map(|field| {
            text_to_persist(data.get(*field)).map(|value| (field.to_string(), Value::String(value)))
        })
        .collect();

    Ok(CreateFee {
        property_id: required_id(data, "property_id")?,
        name: text(data, "name"),
        display_name: text(data, "displayName"),
        description: text_to_persist(data.get("description")),
        fee_type: text(data, "feeType"),
        renewal_letter_display: flag_or_false(data.get("renewalLetterDisplayFlag")),
        quote_section_name: enum_to_persist(data, "quoteSectionName", &QUOTE_SECTION).map(str::to_string),
        max_quantity_in_quote: number_to_persist(data.get("maxQuantityInQuote")).unwrap_or(1.0),
        service_period: service_period_to_persist(data).map(str::to_string),
        variable_adjustment: flag_or_false(data.get("variableAdjustmentFlag")),
        estimated: flag_or_false(data.get("estimatedFlag")),
        relative_price: number_to_persist(data.get("relativePrice")),
        absolute_price: number_to_persist(data.get("absolutePrice")),
        relative_default_price: number_to_persist(data.get("relativeDefaultPrice")),
        absolute_default_price: number_to_persist(data.get("absoluteDefaultPrice")),
        price_floor_ceiling: text_to_persist(data.get("priceFloorCeiling")),
        deposit_interest: flag_or_false(data.get("depositInterestFlag")),
        quote_payment_schedule: flag_or_false(data.get("quotePaymentScheduleFlag")),
        lease_state: enum_to_persist(data, "leaseState", &FEE_LEASE_STATE).map(str::to_string),
        marketing_question_name: text_to_persist(data.get("marketingQuestionName")),
        external_accounts: Value::Object(external_accounts),
    })
}

#[async_trait]
impl ImportHandler for FeeHandler {
    async fn custom_check(
        &mut self,
        data: &mut RowData,
        _index: usize,
    ) -> Result<Vec<InvalidField>, EntityError> {
        fee::canonicalize_fee_type(data);
        let mut invalid = fee::additional_validations(data);
        invalid.extend(fee::validate_relative_price_has_parent(data, &self.sheet));
        Ok(invalid)
    }

    async fn on_valid_entity(&mut self, data: &RowData, index: usize) -> Result<(), EntityError> {
        self.pending.push(PendingFee {
            index,
            input: to_create(data)?,
            related: associated_names(data, RELATED_FEES_FIELD),
            additional: associated_names(data, ADDITIONAL_FEES_FIELD),
        });
        Ok(())
    }
}

/// Check a stored fee's associated names against its property's fees.
///
/// Returns the violations to report on the fee's row and the links to store,
/// or `None` when the new links would close a cycle.
fn check_associations(
    pending: &PendingFee,
    stored: &Fee,
    property_fees: &[PropertyFee],
    graph: &AssociationGraph,
) -> (Vec<InvalidField>, Option<FeeAssociations>) {
    let related = resolve_fee_names(RELATED_FEES_FIELD, &pending.related, property_fees);
    let additional = resolve_fee_names(ADDITIONAL_FEES_FIELD, &pending.additional, property_fees);
    let mut invalid = related.invalid;
    invalid.extend(additional.invalid);
    let (mut related_ids, mut additional_ids) = (related.ids, additional.ids);

    let names: Vec<String> = pending.related.iter().chain(&pending.additional).cloned().collect();
    let (group_invalid, rejected) =
        validate_inventory_group_children(&stored.fee_type, &names, property_fees);
    invalid.extend(group_invalid);
    related_ids.retain(|id| !rejected.contains(id));
    additional_ids.retain(|id| !rejected.contains(id));

    invalid.extend(validate_duplicated_associations(
        &stored.name,
        &mut related_ids,
        &mut additional_ids,
        property_fees,
    ));

    let associated: Vec<DbId> = related_ids.iter().chain(&additional_ids).copied().collect();
    if let Some(cycle) = find_association_cycle(stored.id, &associated, graph) {
        let names: Vec<String> = cycle
            .iter()
            .filter_map(|id| property_fees.iter().find(|fee| fee.id == *id))
            .map(|fee| fee.name.clone())
            .collect();
        invalid.extend(cycle_error(&names));
        return (invalid, None);
    }

    let links = FeeAssociations {
        primary_fee_id: stored.id,
        related_fee_ids: related_ids,
        additional_fee_ids: additional_ids,
    };
    (invalid, Some(links))
}

/// Resolve and store the associated fees of every persisted fee.
async fn associate_fees(
    pool: &DbPool,
    pending: &[PendingFee],
    stored: &[Fee],
) -> AppResult<Vec<RowError>> {
    let mut property_ids: Vec<DbId> = stored.iter().map(|fee| fee.property_id).collect();
    property_ids.sort_unstable();
    property_ids.dedup();

    let mut fees_by_property: HashMap<DbId, Vec<PropertyFee>> = HashMap::new();
    for summary in FeeRepo::list_summaries_by_properties(pool, &property_ids).await? {
        fees_by_property
            .entry(summary.property_id)
            .or_default()
            .push(summary.into());
    }
    let mut graph = AssociationGraph::new(FeeRepo::association_links(pool, &property_ids).await?);

    let mut invalid_rows = Vec::new();
    let mut accepted = Vec::new();
    for (fee, stored) in pending.iter().zip(stored) {
        let property_fees = fees_by_property
            .get(&stored.property_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let (invalid, links) = check_associations(fee, stored, property_fees, &graph);
        if let Some(links) = links {
            let associated: Vec<DbId> = links
                .related_fee_ids
                .iter()
                .chain(&links.additional_fee_ids)
                .copied()
                .collect();
            graph.replace_links(stored.id, &associated);
            accepted.push(links);
        }
        if !invalid.is_empty() {
            invalid_rows.push(RowError::at(fee.index, invalid));
        }
    }

    let linked = FeeRepo::replace_associations(pool, &accepted).await?;
    tracing::info!(fees = accepted.len(), links = linked, "Associated fees replaced");
    Ok(invalid_rows)
}

/// Upsert fees on property and name, then replace their associated fees.
pub async fn import_fees(
    pool: &DbPool,
    rows: Vec<RowData>,
    options: ImportOptions,
) -> AppResult<ImportOutcome> {
    let rows = sheet_rows(rows, &FEES);
    let sheet = rows.iter().map(|row| row.data.clone()).collect();
    let source = PgLookupSource::new(pool.clone());
    let mut handler = FeeHandler {
        sheet,
        pending: Vec::new(),
    };

    let mut invalid_fields = validate(rows, &fee::RULES, &source, &mut handler, Some(&FEES)).await?;

    let pending = dedupe_last_wins(handler.pending, |fee| {
        (fee.input.property_id, fee.input.name.clone())
    });
    let inputs: Vec<CreateFee> = pending.iter().map(|fee| fee.input.clone()).collect();
    let stored = FeeRepo::bulk_upsert(pool, &inputs, options.upsert_chunk_size).await?;
    tracing::info!(fees = stored.len(), chunk_size = options.upsert_chunk_size, "Fees upserted");

    invalid_fields.extend(associate_fees(pool, &pending, &stored).await?);
    Ok(ImportOutcome::new(invalid_fields, &stored)?)
}
