//! Amenities sheet.

use super::{column_length, is_set};
use crate::dal_types::{AMENITY_CATEGORY, AMENITY_SUB_CATEGORY};
use crate::import::pipeline::ImportRules;
use crate::import::prerequisite::Prerequisite;
use crate::types::RowData;
use crate::validation::rules::{FieldRule, InvalidField, ValidationKind::*};

pub const FIELDS: &[FieldRule] = &[
    FieldRule::new("name", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("property", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("category", &[NotEmpty, ExistsIn]).valid_values(AMENITY_CATEGORY),
    FieldRule::new("subCategory", &[ExistsIn]).valid_values(AMENITY_SUB_CATEGORY),
    FieldRule::new("displayName", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("description", &[MaxLength]).max_length(column_length::DESCRIPTION),
    FieldRule::new("highValueFlag", &[Boolean]),
    FieldRule::new("relativePrice", &[Percentage]),
    FieldRule::new("absolutePrice", &[PositiveDecimal]),
    FieldRule::new("targetUnitFlag", &[Boolean]),
    FieldRule::new("hiddenFlag", &[Boolean]),
    FieldRule::new("externalId", &[MaxLength]).max_length(column_length::EXTERNAL_ID),
    FieldRule::new("endDate", &[Date]),
];

pub const PREREQUISITES: &[Prerequisite] =
    &[Prerequisite::new("property", "name", "properties", "property_id")];

pub const RULES: ImportRules<'static> = ImportRules::new(FIELDS, PREREQUISITES);

pub const ONLY_ONE_PRICE_ALLOWED: &str = "ONLY_ONE_OF_RELATIVE_OR_ABSOLUTE_PRICE_ALLOWED";

/// An amenity carries either a relative or an absolute price, never both.
pub fn additional_validations(data: &RowData) -> Vec<InvalidField> {
    if is_set(data, "relativePrice") && is_set(data, "absolutePrice") {
        return vec![
            InvalidField::custom("relativePrice", ONLY_ONE_PRICE_ALLOWED),
            InvalidField::custom("absolutePrice", ONLY_ONE_PRICE_ALLOWED),
        ];
    }
    Vec::new()
}
