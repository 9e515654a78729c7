//! Concessions sheet.

use serde_json::{Map, Value};

use super::{column_length, is_set};
use crate::dal_types::{LEASE_STATE, NON_RECURRING_APPLIED};
use crate::import::coercion::split_cell_by_comma;
use crate::import::pipeline::ImportRules;
use crate::import::prerequisite::Prerequisite;
use crate::types::RowData;
use crate::validation::evaluator::get_field_value;
use crate::validation::lexical::parse_number;
use crate::validation::rules::{FieldRule, InvalidField, ValidationKind::*};

pub const APPLIED_TO_FEES_FIELD: &str = "appliedToFees";

pub const FIELDS: &[FieldRule] = &[
    FieldRule::new("name", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("property", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("displayName", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new(APPLIED_TO_FEES_FIELD, &[NotEmpty]),
    FieldRule::new("relativeAdjustment", &[Numeric]),
    FieldRule::new("absoluteAdjustment", &[Numeric]),
    FieldRule::group(&["relativeAdjustment", "absoluteAdjustment"], &[AtLeastOneNotEmpty]),
    FieldRule::new("recurringCount", &[Integer, MinValue]).min_value(1.0),
    FieldRule::new("nonRecurringAppliedAt", &[MaxLength, ExistsIn])
        .max_length(column_length::NAME)
        .valid_values(NON_RECURRING_APPLIED),
    FieldRule::new("leaseState", &[MaxLength, ExistsIn])
        .max_length(column_length::TYPE)
        .valid_values(LEASE_STATE),
    FieldRule::new("minLeaseLength", &[NumericArray]),
    FieldRule::new("maxLeaseLength", &[NumericArray]),
    FieldRule::new("startDate", &[Date]),
    FieldRule::new("endDate", &[Date]),
    FieldRule::new("account", &[PositiveInteger]),
    FieldRule::new("subAccount", &[Integer]),
    FieldRule::new("externalChargeCode", &[MaxLength]).max_length(column_length::EXTERNAL_ID),
];

pub const PREREQUISITES: &[Prerequisite] =
    &[Prerequisite::new("property", "name", "properties", "property_id")];

pub const RULES: ImportRules<'static> = ImportRules::new(FIELDS, PREREQUISITES);

/// With a floor/ceiling both adjustments are required; without one they are
/// mutually exclusive.
pub fn validate_relative_and_absolute_adjustment(data: &RowData) -> Vec<InvalidField> {
    let relative = is_set(data, "relativeAdjustment");
    let absolute = is_set(data, "absoluteAdjustment");
    let floor_ceiling = is_set(data, "adjustmentFloorCeiling");

    if !floor_ceiling && relative && absolute {
        const MESSAGE: &str =
            "ONLY_ONE_OF_RELATIVE_OR_ABSOLUTE_ADJUSTMENT_ALLOWED_WHEN_PRICE_FLOOR_CEILING_IS_DISABLED";
        return vec![
            InvalidField::custom("relativeAdjustment", MESSAGE),
            InvalidField::custom("absoluteAdjustment", MESSAGE),
        ];
    }
    if floor_ceiling && !(relative && absolute) {
        let missing = if absolute { "relativeAdjustment" } else { "absoluteAdjustment" };
        return vec![InvalidField::custom(
            missing,
            "RELATIVE_AND_ABSOLUTE_ADJUSTMENT_SHOULD_BE_DEFINED_WHEN_PRICE_FLOOR_CEILING_IS_ENABLED",
        )];
    }
    Vec::new()
}

pub fn validate_recurring_applied_at(data: &RowData) -> Vec<InvalidField> {
    if is_set(data, "recurringFlag") && is_set(data, "nonRecurringAppliedAt") {
        return vec![InvalidField::custom(
            "nonRecurringAppliedAt",
            "RECURRING_WITH_NON_RECURRING_APPLIED",
        )];
    }
    Vec::new()
}

pub fn validate_variable_default_adjustments(data: &RowData) -> Vec<InvalidField> {
    let relative = is_set(data, "relativeDefaultAdjustment");
    let absolute = is_set(data, "absoluteDefaultAdjustment");
    let field = if relative { "relativeDefaultAdjustment" } else { "absoluteDefaultAdjustment" };

    if (relative || absolute) && !is_set(data, "variableAdjustmentFlag") {
        return vec![InvalidField::custom(field, "VARIABLE_ADJUSTMENT_FLAG_HAS_TO_BE_ENABLED")];
    }
    if relative && absolute {
        return vec![
            InvalidField::custom("relativeDefaultAdjustment", "ONLY_ONE_DEFAULT_PRICE_IS_ALLOW"),
            InvalidField::custom("absoluteDefaultAdjustment", "ONLY_ONE_DEFAULT_PRICE_IS_ALLOW"),
        ];
    }
    if is_set(data, "bakedIntoAppliedFeeFlag") && (relative || absolute) {
        return vec![InvalidField::custom(field, "BAKED_INTO_APPLIED_FEE_FLAG_HAS_TO_BE_DISABLED")];
    }
    Vec::new()
}

pub fn additional_validations(data: &RowData) -> Vec<InvalidField> {
    let mut invalid = validate_recurring_applied_at(data);
    invalid.extend(validate_variable_default_adjustments(data));
    invalid.extend(validate_relative_and_absolute_adjustment(data));
    invalid
}

/// Lease matching criteria stored with the concession, or `None` when the
/// row restricts nothing.
pub fn matching_criteria(data: &RowData) -> Option<Value> {
    let mut criteria = Map::new();

    for column in ["leaseNames", "layouts", "buildings", "amenities"] {
        let names = split_cell_by_comma(get_field_value(data, column));
        if !names.is_empty() {
            criteria.insert(column.to_string(), Value::from(names));
        }
    }
    for column in ["minLeaseLength", "maxLeaseLength"] {
        let lengths: Vec<Value> = split_cell_by_comma(get_field_value(data, column))
            .iter()
            .filter_map(|length| parse_number(length))
            .filter_map(serde_json::Number::from_f64)
            .map(Value::Number)
            .collect();
        if !lengths.is_empty() {
            criteria.insert(column.to_string(), Value::Array(lengths));
        }
    }

    (!criteria.is_empty()).then_some(Value::Object(criteria))
}
