//! Fees sheet: field rules, per-row domain checks and the associated-fee
//! resolution that runs once the sheet's fees are persisted.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use super::{column_length, is_set, text};
use crate::dal_types::{
    EnumMapping, FEE_LEASE_STATE, FEE_TYPE, FEE_TYPE_DEPOSIT, FEE_TYPE_INVENTORY_GROUP,
    FEE_TYPE_LEASE_BREAK, FEE_TYPE_PENALTY, FEE_TYPE_SERVICE, QUOTE_SECTION, SERVICE_PERIOD,
    SERVICE_PERIOD_ONE_TIME,
};
use crate::import::coercion::{get_value_from_enum, split_cell_by_comma};
use crate::import::pipeline::ImportRules;
use crate::import::prerequisite::Prerequisite;
use crate::types::{DbId, RowData};
use crate::validation::evaluator::get_field_value;
use crate::validation::lexical::{is_blank, to_number};
use crate::validation::rules::{FieldRule, InvalidField, ValidationKind, ValidationKind::*};

pub const RELATED_FEES_FIELD: &str = "relatedFees";
pub const ADDITIONAL_FEES_FIELD: &str = "additionalFees";
pub const CYCLE_IN_ASSOCIATED_FEES: &str = "CYCLE_IN_ASSOCIATED_FEES";
pub const INVALID_FEE_NAME_PROVIDED: &str = "INVALID_FEE_NAME_PROVIDED_IN_COLUMN";
pub const INVENTORY_GROUP_CHILD_NOT_ALLOWED: &str =
    "ONLY_DEPOSIT_OR_NON_RELATIVE_FEES_ALLOWED_UNDER_INVENTORY_GROUP";
pub const RELATIVE_PRICE_WITHOUT_PARENT: &str = "RELATIVE_PRICE_FEE_REQUIRES_A_PARENT_FEE";

const LENGTH_ONLY: &[ValidationKind] = &[MaxLength];

const fn external(field: &'static str) -> FieldRule {
    FieldRule::new(field, LENGTH_ONLY).max_length(column_length::EXTERNAL_ID)
}

const fn notes(field: &'static str) -> FieldRule {
    FieldRule::new(field, LENGTH_ONLY).max_length(column_length::TEXT_2KB)
}

pub const FIELDS: &[FieldRule] = &[
    FieldRule::new("name", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("property", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("displayName", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("feeType", &[NotEmpty, ExistsIn]).valid_values(FEE_TYPE),
    FieldRule::new("renewalLetterDisplayFlag", &[Boolean]),
    FieldRule::new("quoteSectionName", &[ExistsIn]).valid_values(QUOTE_SECTION),
    FieldRule::new("maxQuantityInQuote", &[PositiveInteger]),
    FieldRule::new("servicePeriod", &[ExistsIn]).valid_values(SERVICE_PERIOD),
    FieldRule::new("variableAdjustmentFlag", &[Boolean]),
    FieldRule::new("estimatedFlag", &[Boolean]),
    FieldRule::new("relativePrice", &[PositiveDecimal]),
    FieldRule::new("absolutePrice", &[PositiveDecimal]),
    FieldRule::new("depositInterestFlag", &[Boolean]),
    FieldRule::new("quotePaymentScheduleFlag", &[Boolean]),
    FieldRule::new("leaseState", &[MaxLength, ExistsIn])
        .max_length(column_length::TYPE)
        .valid_values(FEE_LEASE_STATE),
    external("externalChargeCode"),
    external("externalChargeAccount"),
    external("externalChargeAccrualAccount"),
    notes("externalChargeNotes"),
    external("externalChargeRef"),
    external("externalReceiptAccount"),
    external("externalReceiptAccrualAccount"),
    external("externalReceiptOffset"),
    notes("externalReceiptNotes"),
    external("externalReceiptRef"),
    external("externalWaiverAccount"),
    external("externalWaiverAccrualAccount"),
    external("externalWaiverOffset"),
    notes("externalWaiverNotes"),
    external("externalWaiverRef"),
    FieldRule::new("marketingQuestionName", &[MaxLength]).max_length(column_length::NAME),
];

pub const PREREQUISITES: &[Prerequisite] =
    &[Prerequisite::new("property", "name", "properties", "property_id")];

pub const RULES: ImportRules<'static> = ImportRules::new(FIELDS, PREREQUISITES);

/// External accounting columns copied verbatim to the fee record.
pub const EXTERNAL_FIELDS: &[&str] = &[
    "externalChargeCode",
    "externalChargeAccount",
    "externalChargeAccrualAccount",
    "externalChargeNotes",
    "externalChargeRef",
    "externalReceiptAccount",
    "externalReceiptAccrualAccount",
    "externalReceiptOffset",
    "externalReceiptNotes",
    "externalReceiptRef",
    "externalWaiverAccount",
    "externalWaiverAccrualAccount",
    "externalWaiverOffset",
    "externalWaiverNotes",
    "externalWaiverRef",
];

// ── Row checks ───────────────────────────────────────────────────────

/// Replace the `feeType` cell with its canonical value so the checks below
/// can compare against the catalog constants.
pub fn canonicalize_fee_type(data: &mut RowData) {
    if let Some(fee_type) = get_value_from_enum(&FEE_TYPE, data.get("feeType")) {
        data.insert("feeType".to_string(), Value::String(fee_type.to_string()));
    }
}

fn fee_type(data: &RowData) -> String {
    text(data, "feeType")
}

fn both(first: &str, second: &str, message: &str) -> Vec<InvalidField> {
    vec![InvalidField::custom(first, message), InvalidField::custom(second, message)]
}

fn is_empty_cell(data: &RowData, field: &str) -> bool {
    is_blank(get_field_value(data, field))
}

fn is_zero(data: &RowData, field: &str) -> bool {
    matches!(get_field_value(data, field), Some(Value::Number(n)) if n.as_f64() == Some(0.0))
}

pub fn validate_quote_section_name(data: &RowData) -> Vec<InvalidField> {
    if fee_type(data) == FEE_TYPE_PENALTY && is_set(data, "quoteSectionName") {
        return vec![InvalidField::custom(
            "quoteSectionName",
            "QUOTE_SECTION_NAME_SHOULD_BE_EMPTY_FOR_PENALTY",
        )];
    }
    Vec::new()
}

pub fn validate_max_quantity_in_quote(data: &RowData) -> Vec<InvalidField> {
    let fee_type = fee_type(data);
    if !is_set(data, "maxQuantityInQuote")
        || fee_type == FEE_TYPE_SERVICE
        || fee_type == FEE_TYPE_INVENTORY_GROUP
    {
        return Vec::new();
    }
    if to_number(get_field_value(data, "maxQuantityInQuote")) == Some(1.0) {
        return Vec::new();
    }
    vec![InvalidField::custom(
        "maxQuantityInQuote",
        "INVALID_QUANTITY_IN_QUOTE_VALUE_FOR_TYPE",
    )]
}

pub fn validate_service_period(data: &RowData) -> Vec<InvalidField> {
    let fee_type = fee_type(data);
    let one_time_only = [FEE_TYPE_PENALTY, FEE_TYPE_DEPOSIT, FEE_TYPE_LEASE_BREAK].contains(&fee_type.as_str());
    let has_period = is_set(data, "servicePeriod");

    if one_time_only
        && has_period
        && get_value_from_enum(&SERVICE_PERIOD, data.get("servicePeriod")) != Some(SERVICE_PERIOD_ONE_TIME)
    {
        return vec![InvalidField::custom("servicePeriod", "INVALID_SERVICE_PERIOD_FOR_TYPE")];
    }
    if fee_type == FEE_TYPE_SERVICE && !has_period {
        return vec![InvalidField::custom(
            "servicePeriod",
            "MUST_HAVE_VALID_SERVICE_PERIOD_FOR_SERVICE_TYPE",
        )];
    }
    Vec::new()
}

/// Flags an inventory group must leave empty.
pub fn validate_inventory_group_flags(data: &RowData) -> Vec<InvalidField> {
    if fee_type(data) != FEE_TYPE_INVENTORY_GROUP {
        return Vec::new();
    }
    let mut invalid = Vec::new();
    if is_set(data, "variableAdjustmentFlag") {
        invalid.push(InvalidField::custom(
            "variableAdjustmentFlag",
            "VARIABLE_ADJUSTMENT_FLAG_SHOULD_BE_EMPTY_FOR_INVENTORY_GROUP",
        ));
    }
    if is_set(data, "estimatedFlag") {
        invalid.push(InvalidField::custom(
            "estimatedFlag",
            "ESTIMATED_FLAG_SHOULD_BE_EMPTY_FOR_INVENTORY_GROUP",
        ));
    }
    invalid
}

/// Relative and absolute prices are exclusive unless a price floor/ceiling
/// is configured, in which case both are required.
pub fn validate_relative_and_absolute_price(data: &RowData) -> Vec<InvalidField> {
    let fee_type = fee_type(data);
    let relative = is_set(data, "relativePrice");
    let absolute = is_set(data, "absolutePrice");
    let floor_ceiling = is_set(data, "priceFloorCeiling");

    if !floor_ceiling && relative && absolute {
        return both(
            "relativePrice",
            "absolutePrice",
            "ONLY_ONE_OF_RELATIVE_OR_ABSOLUTE_PRICE_ALLOWED_WHEN_PRICE_FLOOR_CEILING_IS_DISABLED",
        );
    }
    if floor_ceiling && !(relative && absolute) {
        let missing = if absolute { "relativePrice" } else { "absolutePrice" };
        return vec![InvalidField::custom(
            missing,
            "RELATIVE_AND_ABSOLUTE_PRICE_SHOULD_BE_DEFINED_WHEN_PRICE_FLOOR_CEILING_IS_ENABLED",
        )];
    }

    let relative_empty = is_empty_cell(data, "relativePrice");
    let absolute_empty = is_empty_cell(data, "absolutePrice");
    if fee_type != FEE_TYPE_INVENTORY_GROUP && relative_empty && absolute_empty {
        return both(
            "relativePrice",
            "absolutePrice",
            "RELATIVE_AND_ABSOLUTE_PRICE_SHOULD_NOT_BE_EMPTY_EXCEPT_INVENTORY_GROUP",
        );
    }
    if fee_type == FEE_TYPE_INVENTORY_GROUP && !relative_empty {
        return vec![InvalidField::custom(
            "relativePrice",
            "RELATIVE_PRICE_SHOULD_BE_EMPTY_FOR_INVENTORY_GROUP",
        )];
    }
    if fee_type == FEE_TYPE_INVENTORY_GROUP && !absolute_empty {
        return vec![InvalidField::custom(
            "absolutePrice",
            "ABSOLUTE_PRICE_SHOULD_BE_EMPTY_FOR_INVENTORY_GROUP",
        )];
    }
    if is_set(data, "variableAdjustmentFlag") && (is_zero(data, "relativePrice") || is_zero(data, "absolutePrice")) {
        return both(
            "relativePrice",
            "absolutePrice",
            "RELATIVE_OR_ABSOLUTE_PRICE_SHOULD_NOT_BE_ZERO_FOR_VARIABLE_ADJUSTMENT_FLAG",
        );
    }
    Vec::new()
}

pub fn validate_deposit_interest_flag(data: &RowData) -> Vec<InvalidField> {
    if fee_type(data) != FEE_TYPE_DEPOSIT && is_set(data, "depositInterestFlag") {
        return vec![InvalidField::custom(
            "depositInterestFlag",
            "DEPOSIT_FLAG_SHOULD_BE_EMPTY_FOR_NON_DEPOSIT_FEES",
        )];
    }
    Vec::new()
}

/// Default prices need the variable adjustment flag, and only one of them
/// may be set.
pub fn validate_variable_default_prices(data: &RowData) -> Vec<InvalidField> {
    let relative = is_set(data, "relativeDefaultPrice");
    let absolute = is_set(data, "absoluteDefaultPrice");

    if (relative || absolute) && !is_set(data, "variableAdjustmentFlag") {
        let name = if relative { "relativeDefaultPrice" } else { "absoluteDefaultPrice" };
        return vec![InvalidField::custom(name, "VARIABLE_ADJUSTMENT_FLAG_HAS_TO_BE_ENABLED")];
    }
    if relative && absolute {
        return both("relativeDefaultPrice", "absoluteDefaultPrice", "ONLY_ONE_DEFAULT_PRICE_IS_ALLOW");
    }
    Vec::new()
}

/// Every per-row fee check, in reporting order. Expects a canonical
/// `feeType` (see [`canonicalize_fee_type`]).
pub fn additional_validations(data: &RowData) -> Vec<InvalidField> {
    let mut invalid = validate_quote_section_name(data);
    invalid.extend(validate_max_quantity_in_quote(data));
    invalid.extend(validate_service_period(data));
    invalid.extend(validate_inventory_group_flags(data));
    invalid.extend(validate_relative_and_absolute_price(data));
    invalid.extend(validate_deposit_interest_flag(data));
    invalid.extend(validate_variable_default_prices(data));
    invalid
}

/// Service period to store: one-time fee types always persist `oneTime`.
pub fn service_period_to_persist(data: &RowData) -> Option<&'static str> {
    if !is_set(data, "servicePeriod") {
        return None;
    }
    let fee_type = fee_type(data);
    if [FEE_TYPE_PENALTY, FEE_TYPE_DEPOSIT, FEE_TYPE_LEASE_BREAK].contains(&fee_type.as_str()) {
        return Some(SERVICE_PERIOD_ONE_TIME);
    }
    get_value_from_enum(&SERVICE_PERIOD, data.get("servicePeriod"))
}

/// Canonical value of an enum column, or `None` when blank or unknown.
pub fn enum_to_persist(data: &RowData, field: &str, mapping: &EnumMapping) -> Option<&'static str> {
    get_value_from_enum(mapping, get_field_value(data, field))
}

/// Keep the last occurrence of each key, preserving the original order of
/// the survivors.
pub fn dedupe_last_wins<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut kept: Vec<T> = items.into_iter().rev().filter(|item| seen.insert(key(item))).collect();
    kept.reverse();
    kept
}

// ── Associated fees ──────────────────────────────────────────────────

/// A persisted fee of the property being imported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyFee {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub fee_type: String,
    pub relative_price: Option<f64>,
    pub relative_default_price: Option<f64>,
}

impl PropertyFee {
    fn is_named(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

/// Fee ids named in an associated-fees column, with a violation for the
/// names that match no fee of the property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFees {
    pub ids: Vec<DbId>,
    pub invalid: Vec<InvalidField>,
}

pub fn resolve_fee_names(column: &str, names: &[String], property_fees: &[PropertyFee]) -> ResolvedFees {
    let mut resolved = ResolvedFees::default();
    let mut unknown = Vec::new();
    for name in names {
        match property_fees.iter().find(|fee| fee.is_named(name)) {
            Some(fee) if !resolved.ids.contains(&fee.id) => resolved.ids.push(fee.id),
            Some(_) => {}
            None => unknown.push(name.as_str()),
        }
    }
    if !unknown.is_empty() {
        resolved.invalid.push(InvalidField::custom(
            column,
            format!("{INVALID_FEE_NAME_PROVIDED}: {}", unknown.join(", ")),
        ));
    }
    resolved
}

/// Children of an inventory group must be deposits or carry no relative
/// price. Returns the violations and the offending fee ids.
pub fn validate_inventory_group_children(
    fee_type: &str,
    names: &[String],
    property_fees: &[PropertyFee],
) -> (Vec<InvalidField>, Vec<DbId>) {
    let mut invalid = Vec::new();
    let mut ids = Vec::new();
    if fee_type != FEE_TYPE_INVENTORY_GROUP {
        return (invalid, ids);
    }

    for fee in property_fees.iter().filter(|fee| names.iter().any(|n| fee.is_named(n))) {
        if fee.fee_type == FEE_TYPE_DEPOSIT
            || (fee.relative_price.is_none() && fee.relative_default_price.is_none())
        {
            continue;
        }
        let field = if fee.relative_price.is_some() { "relativePrice" } else { "relativeDefaultPrice" };
        invalid.push(InvalidField::custom(
            field,
            format!("{}: {INVENTORY_GROUP_CHILD_NOT_ALLOWED}", fee.display_name),
        ));
        ids.push(fee.id);
    }
    (invalid, ids)
}

/// Drop from both lists any fee named as related and additional at once.
pub fn validate_duplicated_associations(
    fee_name: &str,
    related: &mut Vec<DbId>,
    additional: &mut Vec<DbId>,
    property_fees: &[PropertyFee],
) -> Vec<InvalidField> {
    let duplicated: Vec<DbId> = related.iter().copied().filter(|id| additional.contains(id)).collect();
    if duplicated.is_empty() {
        return Vec::new();
    }
    related.retain(|id| !duplicated.contains(id));
    additional.retain(|id| !duplicated.contains(id));

    let names: Vec<&str> = duplicated
        .iter()
        .filter_map(|id| property_fees.iter().find(|fee| fee.id == *id))
        .map(|fee| fee.name.as_str())
        .collect();
    vec![InvalidField::custom(
        fee_name,
        format!("These fees are both in additional and related columns: {}", names.join(",")),
    )]
}

/// Existing `primary -> associated` fee links, indexed by the associated fee.
#[derive(Debug, Clone, Default)]
pub struct AssociationGraph {
    primaries: HashMap<DbId, Vec<DbId>>,
}

impl AssociationGraph {
    pub fn new(links: impl IntoIterator<Item = (DbId, DbId)>) -> Self {
        let mut primaries: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for (primary, associated) in links {
            primaries.entry(associated).or_default().push(primary);
        }
        Self { primaries }
    }

    /// Make `associated` the only fees `primary` links to.
    pub fn replace_links(&mut self, primary: DbId, associated: &[DbId]) {
        for primaries in self.primaries.values_mut() {
            primaries.retain(|id| *id != primary);
        }
        for fee in associated {
            self.primaries.entry(*fee).or_default().push(primary);
        }
    }

    fn primaries_of(&self, fees: &[DbId]) -> Vec<DbId> {
        let mut found: Vec<DbId> = fees
            .iter()
            .flat_map(|fee| self.primaries.get(fee).into_iter().flatten().copied())
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }
}

/// Walk up from `fee_id` through the fees that already list it and report
/// the ancestors it would now associate with.
///
/// Returns the ids closing the cycle, or `[fee_id]` when the walk loops back
/// without touching the new associations. `None` when linking is safe.
pub fn find_association_cycle(
    fee_id: DbId,
    associated: &[DbId],
    graph: &AssociationGraph,
) -> Option<Vec<DbId>> {
    if associated.contains(&fee_id) {
        return Some(vec![fee_id]);
    }
    let targets: HashSet<DbId> = associated.iter().copied().collect();
    let mut visited = HashSet::from([fee_id]);
    let mut parents = vec![fee_id];

    loop {
        let primaries = graph.primaries_of(&parents);
        if primaries.is_empty() {
            return None;
        }
        let intersection: Vec<DbId> = primaries.iter().copied().filter(|id| targets.contains(id)).collect();
        if !intersection.is_empty() {
            return Some(intersection);
        }
        let unseen: Vec<DbId> = primaries.into_iter().filter(|id| visited.insert(*id)).collect();
        if unseen.is_empty() {
            return Some(vec![fee_id]);
        }
        parents = unseen;
    }
}

pub fn cycle_error(names: &[String]) -> Vec<InvalidField> {
    vec![
        InvalidField::custom(RELATED_FEES_FIELD, ""),
        InvalidField::custom(
            ADDITIONAL_FEES_FIELD,
            format!("{CYCLE_IN_ASSOCIATED_FEES}: {}", names.join(",")),
        ),
    ]
}

/// Names listed in one of the associated-fees columns of a row.
pub fn associated_names(data: &RowData, column: &str) -> Vec<String> {
    split_cell_by_comma(get_field_value(data, column))
}

/// A fee with a relative price must be listed by another fee of the same
/// property somewhere in the sheet.
pub fn validate_relative_price_has_parent(data: &RowData, sheet: &[RowData]) -> Vec<InvalidField> {
    if is_empty_cell(data, "relativePrice") {
        return Vec::new();
    }
    let name = text(data, "name");
    let property = text(data, "property");
    let has_parent = sheet.iter().any(|other| {
        text(other, "property").eq_ignore_ascii_case(&property)
            && [RELATED_FEES_FIELD, ADDITIONAL_FEES_FIELD]
                .iter()
                .flat_map(|column| associated_names(other, column))
                .any(|child| child.eq_ignore_ascii_case(&name))
    });
    if has_parent {
        return Vec::new();
    }
    vec![InvalidField::custom(
        "relativePrice",
        format!("{name}: {RELATIVE_PRICE_WITHOUT_PARENT}"),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::evaluator::validate_fields;
    use serde_json::json;

    fn data(pairs: &[(&str, Value)]) -> RowData {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn messages(invalid: &[InvalidField]) -> Vec<(&str, &str)> {
        invalid.iter().map(|f| (f.name.as_str(), f.message.as_str())).collect()
    }

    fn fee(id: DbId, name: &str, fee_type: &str, relative_price: Option<f64>) -> PropertyFee {
        PropertyFee {
            id,
            name: name.to_string(),
            display_name: name.to_string(),
            fee_type: fee_type.to_string(),
            relative_price,
            relative_default_price: None,
        }
    }

    fn service_fee() -> RowData {
        data(&[
            ("name", json!("Parking")),
            ("property", json!("Parkmerced")),
            ("displayName", json!("Parking")),
            ("feeType", json!("service")),
            ("servicePeriod", json!("month")),
            ("absolutePrice", json!(100)),
            ("relativePrice", json!("")),
        ])
    }

    #[test]
    fn field_rules_accept_a_service_fee() {
        assert!(validate_fields(&service_fee(), FIELDS).is_empty());
        assert!(additional_validations(&service_fee()).is_empty());
    }

    #[test]
    fn fee_type_is_canonicalized() {
        let mut row = data(&[("feeType", json!(" InventoryGroup "))]);
        canonicalize_fee_type(&mut row);
        assert_eq!(row["feeType"], json!("inventoryGroup"));

        let mut keyed = data(&[("feeType", json!("INVENTORY_GROUP"))]);
        canonicalize_fee_type(&mut keyed);
        assert_eq!(keyed["feeType"], json!("inventoryGroup"));
    }

    #[test]
    fn keyed_inventory_group_needs_no_price() {
        let mut row = data(&[
            ("feeType", json!("INVENTORY_GROUP")),
            ("relativePrice", json!("")),
            ("absolutePrice", json!("")),
        ]);
        canonicalize_fee_type(&mut row);
        assert!(validate_relative_and_absolute_price(&row).is_empty());
    }

    #[test]
    fn penalty_cannot_have_quote_section() {
        let row = data(&[("feeType", json!("penalty")), ("quoteSectionName", json!("deposit"))]);
        assert_eq!(
            messages(&validate_quote_section_name(&row)),
            vec![("quoteSectionName", "QUOTE_SECTION_NAME_SHOULD_BE_EMPTY_FOR_PENALTY")]
        );
    }

    #[test]
    fn max_quantity_depends_on_type() {
        let deposit = |quantity: Value| data(&[("feeType", json!("deposit")), ("maxQuantityInQuote", quantity)]);
        assert!(validate_max_quantity_in_quote(&deposit(json!(1))).is_empty());
        assert!(validate_max_quantity_in_quote(&deposit(json!(0))).is_empty());
        assert!(validate_max_quantity_in_quote(&deposit(json!(""))).is_empty());
        assert_eq!(validate_max_quantity_in_quote(&deposit(json!(3))).len(), 1);

        let service = data(&[("feeType", json!("service")), ("maxQuantityInQuote", json!(3))]);
        assert!(validate_max_quantity_in_quote(&service).is_empty());
    }

    #[test]
    fn service_period_rules() {
        let penalty = data(&[("feeType", json!("penalty")), ("servicePeriod", json!("month"))]);
        assert_eq!(
            messages(&validate_service_period(&penalty)),
            vec![("servicePeriod", "INVALID_SERVICE_PERIOD_FOR_TYPE")]
        );
        let one_time = data(&[("feeType", json!("penalty")), ("servicePeriod", json!("OneTime"))]);
        assert!(validate_service_period(&one_time).is_empty());

        let service = data(&[("feeType", json!("service"))]);
        assert_eq!(
            messages(&validate_service_period(&service)),
            vec![("servicePeriod", "MUST_HAVE_VALID_SERVICE_PERIOD_FOR_SERVICE_TYPE")]
        );
    }

    #[test]
    fn service_period_persists_one_time_for_one_time_types() {
        let lease_break = data(&[("feeType", json!("leaseBreak")), ("servicePeriod", json!("month"))]);
        assert_eq!(service_period_to_persist(&lease_break), Some("oneTime"));
        assert_eq!(service_period_to_persist(&service_fee()), Some("month"));
        assert_eq!(service_period_to_persist(&data(&[("feeType", json!("service"))])), None);
    }

    #[test]
    fn inventory_group_leaves_flags_and_prices_empty() {
        let row = data(&[
            ("feeType", json!("inventoryGroup")),
            ("variableAdjustmentFlag", json!(true)),
            ("estimatedFlag", json!(true)),
            ("relativePrice", json!("")),
            ("absolutePrice", json!("")),
        ]);
        assert_eq!(
            messages(&validate_inventory_group_flags(&row)),
            vec![
                ("variableAdjustmentFlag", "VARIABLE_ADJUSTMENT_FLAG_SHOULD_BE_EMPTY_FOR_INVENTORY_GROUP"),
                ("estimatedFlag", "ESTIMATED_FLAG_SHOULD_BE_EMPTY_FOR_INVENTORY_GROUP"),
            ]
        );
        assert!(validate_relative_and_absolute_price(&row).is_empty());

        let priced = data(&[("feeType", json!("inventoryGroup")), ("absolutePrice", json!(10))]);
        assert_eq!(
            messages(&validate_relative_and_absolute_price(&priced)),
            vec![("absolutePrice", "ABSOLUTE_PRICE_SHOULD_BE_EMPTY_FOR_INVENTORY_GROUP")]
        );
    }

    #[test]
    fn prices_are_exclusive_without_floor_ceiling() {
        let row = data(&[
            ("feeType", json!("service")),
            ("relativePrice", json!(10)),
            ("absolutePrice", json!(100)),
        ]);
        let invalid = validate_relative_and_absolute_price(&row);
        assert_eq!(invalid.len(), 2);
        assert_eq!(
            invalid[0].message,
            "ONLY_ONE_OF_RELATIVE_OR_ABSOLUTE_PRICE_ALLOWED_WHEN_PRICE_FLOOR_CEILING_IS_DISABLED"
        );

        let mut floor = row.clone();
        floor.insert("priceFloorCeiling".into(), json!("floor"));
        assert!(validate_relative_and_absolute_price(&floor).is_empty());

        floor.insert("relativePrice".into(), json!(""));
        assert_eq!(
            messages(&validate_relative_and_absolute_price(&floor)),
            vec![(
                "relativePrice",
                "RELATIVE_AND_ABSOLUTE_PRICE_SHOULD_BE_DEFINED_WHEN_PRICE_FLOOR_CEILING_IS_ENABLED"
            )]
        );
    }

    #[test]
    fn prices_required_except_inventory_group() {
        let row = data(&[("feeType", json!("service")), ("relativePrice", json!("")), ("absolutePrice", json!(""))]);
        assert_eq!(validate_relative_and_absolute_price(&row).len(), 2);
    }

    #[test]
    fn zero_price_with_variable_adjustment() {
        let row = data(&[
            ("feeType", json!("service")),
            ("variableAdjustmentFlag", json!(true)),
            ("relativePrice", json!("")),
            ("absolutePrice", json!(0)),
        ]);
        let invalid = validate_relative_and_absolute_price(&row);
        assert_eq!(
            invalid[0].message,
            "RELATIVE_OR_ABSOLUTE_PRICE_SHOULD_NOT_BE_ZERO_FOR_VARIABLE_ADJUSTMENT_FLAG"
        );
    }

    #[test]
    fn deposit_interest_only_on_deposits() {
        let row = data(&[("feeType", json!("service")), ("depositInterestFlag", json!(true))]);
        assert_eq!(validate_deposit_interest_flag(&row).len(), 1);
        let deposit = data(&[("feeType", json!("deposit")), ("depositInterestFlag", json!(true))]);
        assert!(validate_deposit_interest_flag(&deposit).is_empty());
    }

    #[test]
    fn default_prices_need_variable_adjustment() {
        let row = data(&[("absoluteDefaultPrice", json!(50))]);
        assert_eq!(
            messages(&validate_variable_default_prices(&row)),
            vec![("absoluteDefaultPrice", "VARIABLE_ADJUSTMENT_FLAG_HAS_TO_BE_ENABLED")]
        );
        let both = data(&[
            ("variableAdjustmentFlag", json!(true)),
            ("relativeDefaultPrice", json!(5)),
            ("absoluteDefaultPrice", json!(50)),
        ]);
        assert_eq!(validate_variable_default_prices(&both).len(), 2);
    }

    #[test]
    fn dedupe_keeps_last_occurrence() {
        let items = vec![("a", 1), ("b", 2), ("a", 3)];
        assert_eq!(dedupe_last_wins(items, |(name, _)| *name), vec![("b", 2), ("a", 3)]);
    }

    #[test]
    fn fee_names_resolve_within_the_property() {
        let fees = vec![fee(1, "Parking", "service", None), fee(2, "Pet deposit", "deposit", None)];
        let names = vec!["parking".to_string(), "Storage".to_string(), "Pet deposit ".to_string()];
        let resolved = resolve_fee_names(RELATED_FEES_FIELD, &names, &fees);
        assert_eq!(resolved.ids, vec![1, 2]);
        assert_eq!(
            messages(&resolved.invalid),
            vec![("relatedFees", "INVALID_FEE_NAME_PROVIDED_IN_COLUMN: Storage")]
        );
    }

    #[test]
    fn inventory_group_children_must_be_deposit_or_absolute() {
        let fees = vec![fee(1, "Pet rent", "service", Some(5.0)), fee(2, "Pet deposit", "deposit", Some(5.0))];
        let names = vec!["Pet rent".to_string(), "Pet deposit".to_string()];
        let (invalid, ids) = validate_inventory_group_children(FEE_TYPE_INVENTORY_GROUP, &names, &fees);
        assert_eq!(ids, vec![1]);
        assert_eq!(invalid[0].name, "relativePrice");

        let (invalid, _) = validate_inventory_group_children(FEE_TYPE_SERVICE, &names, &fees);
        assert!(invalid.is_empty());
    }

    #[test]
    fn duplicated_associations_are_dropped() {
        let fees = vec![fee(1, "Parking", "service", None), fee(2, "Storage", "service", None)];
        let mut related = vec![1, 2];
        let mut additional = vec![2];
        let invalid = validate_duplicated_associations("Garage", &mut related, &mut additional, &fees);
        assert_eq!(related, vec![1]);
        assert!(additional.is_empty());
        assert_eq!(
            messages(&invalid),
            vec![("Garage", "These fees are both in additional and related columns: Storage")]
        );
    }

    #[test]
    fn cycles_are_detected_through_ancestors() {
        // 1 -> 2 -> 3 already exist; linking 3 -> 1 closes the loop.
        let graph = AssociationGraph::new([(1, 2), (2, 3)]);
        assert_eq!(find_association_cycle(3, &[1], &graph), Some(vec![1]));
        assert_eq!(find_association_cycle(3, &[4], &graph), None);
        assert_eq!(find_association_cycle(1, &[3], &graph), None);
    }

    #[test]
    fn looping_graph_terminates() {
        let graph = AssociationGraph::new([(1, 2), (2, 1)]);
        assert_eq!(find_association_cycle(1, &[5], &graph), Some(vec![1]));
        assert_eq!(find_association_cycle(5, &[5], &graph), Some(vec![5]));
    }

    #[test]
    fn replaced_links_feed_later_checks() {
        let mut graph = AssociationGraph::new([(1, 2)]);
        graph.replace_links(2, &[3]);
        assert_eq!(find_association_cycle(3, &[1], &graph), Some(vec![1]));

        graph.replace_links(1, &[]);
        assert_eq!(find_association_cycle(3, &[1], &graph), None);
    }

    #[test]
    fn cycle_error_reports_both_columns() {
        let invalid = cycle_error(&["Parking".to_string()]);
        assert_eq!(
            messages(&invalid),
            vec![("relatedFees", ""), ("additionalFees", "CYCLE_IN_ASSOCIATED_FEES: Parking")]
        );
    }

    #[test]
    fn relative_price_fees_need_a_parent_in_the_sheet() {
        let child = data(&[("name", json!("Pet rent")), ("property", json!("Cove")), ("relativePrice", json!(5))]);
        let parent = data(&[
            ("name", json!("Pet")),
            ("property", json!("Cove")),
            ("relatedFees", json!("Other, pet rent")),
        ]);
        assert!(validate_relative_price_has_parent(&child, &[parent, child.clone()]).is_empty());
        assert_eq!(validate_relative_price_has_parent(&child, &[child.clone()]).len(), 1);
    }
}
