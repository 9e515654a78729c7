//! Field rule evaluator. Pure logic, no database access.

use serde_json::Value;

use super::registry::{validator, ValidatorContext};
use super::rules::{FieldRule, FieldTarget, InvalidField};
use crate::types::RowData;

/// Read a cell by header.
///
/// Headers that span lines in the sheet (`comms\ndefaultPropertyProgram`)
/// fall back to a nested lookup when the flat key is absent.
pub fn get_field_value<'a>(data: &'a RowData, field: &str) -> Option<&'a Value> {
    if let Some(value) = data.get(field) {
        return Some(value);
    }
    if !field.contains('\n') {
        return None;
    }
    let mut segments = field.split('\n').map(str::trim);
    let first = segments.next()?;
    segments.try_fold(data.get(first)?, |current, segment| current.get(segment))
}

/// Evaluate every rule against one row.
///
/// All validation kinds of a rule are checked independently; every failure
/// is reported, in rule order then kind order.
pub fn validate_fields(data: &RowData, rules: &[FieldRule]) -> Vec<InvalidField> {
    let mut invalid = Vec::new();

    for rule in rules {
        match rule.target {
            FieldTarget::Single(field) => {
                let field_value = get_field_value(data, field);
                let reported = rule.excel_column.unwrap_or(field);
                for kind in rule.validations {
                    let check = validator(*kind);
                    let ctx = ValidatorContext {
                        field_value,
                        field_values: None,
                        rule,
                    };
                    if !(check.predicate)(&ctx) {
                        invalid.push(InvalidField::field(reported, check.error_token));
                    }
                }
            }
            FieldTarget::Many(fields) => {
                let values: Vec<Option<&Value>> = fields.iter().map(|f| data.get(*f)).collect();
                for kind in rule.validations {
                    let check = validator(*kind);
                    let ctx = ValidatorContext {
                        field_value: None,
                        field_values: Some(values.as_slice()),
                        rule,
                    };
                    if !(check.predicate)(&ctx) {
                        invalid.extend(
                            fields
                                .iter()
                                .map(|field| InvalidField::field(*field, check.error_token)),
                        );
                    }
                }
            }
        }
    }

    invalid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dal_types::EnumMapping;
    use crate::validation::rules::{ValidationKind, ViolationKind};
    use serde_json::json;

    fn data(pairs: &[(&str, Value)]) -> RowData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn names_and_messages(invalid: &[InvalidField]) -> Vec<(&str, &str)> {
        invalid
            .iter()
            .map(|f| (f.name.as_str(), f.message.as_str()))
            .collect()
    }

    const REQUIRED_NAME: &[FieldRule] = &[FieldRule::new("name", &[ValidationKind::NotEmpty])];

    #[test]
    fn not_empty_reports_field_required() {
        for row in [data(&[("name", json!(""))]), data(&[("name", Value::Null)]), data(&[])] {
            let result = validate_fields(&row, REQUIRED_NAME);
            assert_eq!(names_and_messages(&result), vec![("name", "FIELD_REQUIRED")]);
            assert_eq!(result[0].kind, ViolationKind::Field);
        }
        assert!(validate_fields(&data(&[("name", json!("name"))]), REQUIRED_NAME).is_empty());
    }

    #[test]
    fn exists_in_accepts_lists_of_valid_values() {
        const VALID_VALUES: EnumMapping = EnumMapping(&[("A", "Valid Type1"), ("B", "Valid Type2")]);
        const RULES: &[FieldRule] =
            &[FieldRule::new("type", &[ValidationKind::ExistsIn]).valid_values(VALID_VALUES)];

        let invalid = validate_fields(&data(&[("type", json!("Valid Type"))]), RULES);
        assert_eq!(names_and_messages(&invalid), vec![("type", "INVALID_VALUE")]);

        for valid in ["", "Valid Type1", "valid type2", "Valid Type2, Valid Type1"] {
            assert!(validate_fields(&data(&[("type", json!(valid))]), RULES).is_empty(), "{valid}");
        }
    }

    #[test]
    fn at_least_one_not_empty_reports_every_field() {
        const RULES: &[FieldRule] =
            &[FieldRule::group(&["owner", "ownerGroup"], &[ValidationKind::AtLeastOneNotEmpty])];

        let invalid = validate_fields(&data(&[("owner", json!("")), ("ownerGroup", json!(""))]), RULES);
        assert_eq!(
            names_and_messages(&invalid),
            vec![
                ("owner", "ONE_OF_THIS_FIELDS_REQUIRED"),
                ("ownerGroup", "ONE_OF_THIS_FIELDS_REQUIRED"),
            ]
        );

        let valid = data(&[("owner", json!("")), ("ownerGroup", json!("Name"))]);
        assert!(validate_fields(&valid, RULES).is_empty());
    }

    #[test]
    fn every_failing_kind_is_reported_in_order() {
        const RULES: &[FieldRule] = &[FieldRule::new(
            "number",
            &[ValidationKind::Numeric, ValidationKind::Integer, ValidationKind::PositiveDecimal],
        )];

        let invalid = validate_fields(&data(&[("number", json!("abc"))]), RULES);
        assert_eq!(
            names_and_messages(&invalid),
            vec![
                ("number", "NOT_A_NUMBER"),
                ("number", "NOT_INTEGER"),
                ("number", "NOT_POSITIVE_DECIMAL"),
            ]
        );
    }

    #[test]
    fn integer_rejects_fractions() {
        const RULES: &[FieldRule] = &[FieldRule::new("number", &[ValidationKind::Integer])];
        assert!(validate_fields(&data(&[("number", json!("5"))]), RULES).is_empty());
        assert!(validate_fields(&data(&[("number", json!("-1"))]), RULES).is_empty());
        assert_eq!(validate_fields(&data(&[("number", json!("6.5"))]), RULES).len(), 1);
        assert_eq!(validate_fields(&data(&[("number", json!("-5.5"))]), RULES).len(), 1);
    }

    #[test]
    fn excel_column_replaces_reported_name() {
        const RULES: &[FieldRule] = &[FieldRule::new("feeName", &[ValidationKind::NotEmpty]).excel_column("name")];
        let invalid = validate_fields(&data(&[]), RULES);
        assert_eq!(names_and_messages(&invalid), vec![("name", "FIELD_REQUIRED")]);
    }

    #[test]
    fn multi_line_headers_read_nested_values() {
        const RULES: &[FieldRule] =
            &[FieldRule::new("comms\ndefaultPropertyProgram", &[ValidationKind::NotEmpty])];
        let row = data(&[("comms", json!({ "defaultPropertyProgram": "program" }))]);
        assert!(validate_fields(&row, RULES).is_empty());

        let flat = data(&[("comms\ndefaultPropertyProgram", json!(""))]);
        assert_eq!(validate_fields(&flat, RULES).len(), 1);
    }

    #[test]
    fn blank_cells_pass_lexical_checks() {
        const RULES: &[FieldRule] = &[
            FieldRule::new("date", &[ValidationKind::Date]),
            FieldRule::new("amount", &[ValidationKind::Currency]),
            FieldRule::new("phone", &[ValidationKind::PhoneNumber]),
            FieldRule::new("url", &[ValidationKind::Url]),
        ];
        let row = data(&[("date", json!("")), ("amount", json!(" ")), ("phone", Value::Null)]);
        assert!(validate_fields(&row, RULES).is_empty());
    }

    #[test]
    fn lexical_failures_use_their_tokens() {
        const RULES: &[FieldRule] = &[
            FieldRule::new("date", &[ValidationKind::Date]),
            FieldRule::new("amount", &[ValidationKind::Currency]),
            FieldRule::new("displayUrl", &[ValidationKind::Url]),
            FieldRule::new("relativePrice", &[ValidationKind::Percentage]),
            FieldRule::new("fieldToBeValidated", &[ValidationKind::TimeZone]),
        ];
        let row = data(&[
            ("date", json!("incorrectName")),
            ("amount", json!("100.00")),
            ("displayUrl", json!("www.customeroldapartments.com/forest-park-apartments/fb")),
            ("relativePrice", json!("101")),
            ("fieldToBeValidated", json!("invalid-time-zone")),
        ]);
        assert_eq!(
            names_and_messages(&validate_fields(&row, RULES)),
            vec![
                ("date", "INVALID_DATE"),
                ("amount", "INVALID_CURRENCY"),
                ("displayUrl", "INVALID_URL"),
                ("relativePrice", "INVALID_PERCENTAGE_VALUE"),
                ("fieldToBeValidated", "INVALID_TIME_ZONE"),
            ]
        );
    }
}
