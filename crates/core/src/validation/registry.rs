//! The field validator registry: one pure predicate per [`ValidationKind`].
//!
//! Every check except `notEmpty`, `atLeastOneNotEmpty` and `boolean` accepts a
//! blank cell; presence is only ever enforced by `notEmpty`.

use serde_json::Value;

use super::lexical::{
    cell_text, has_no_dash_hyphen_or_dot, is_blank, is_integer, is_valid_decimal, is_valid_email,
    is_valid_percentage, is_valid_phone_number, is_valid_postal_code, is_valid_shorthand,
    is_valid_time_zone, is_valid_url, is_valid_us_currency, to_number, try_parse_as_date,
};
use super::rules::{FieldRule, ValidationKind};
use crate::import::coercion::{convert_string_value_to_array, exists_in, is_valid_minimum_value};

/// Inputs to a single predicate call.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorContext<'a> {
    pub field_value: Option<&'a Value>,
    /// Set only for multi-field rules.
    pub field_values: Option<&'a [Option<&'a Value>]>,
    pub rule: &'a FieldRule,
}

/// A registry entry.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    pub predicate: fn(&ValidatorContext<'_>) -> bool,
    pub error_token: &'static str,
}

/// Look up the registry entry for `kind`.
pub fn validator(kind: ValidationKind) -> Validator {
    let predicate: fn(&ValidatorContext<'_>) -> bool = match kind {
        ValidationKind::NotEmpty => not_empty,
        ValidationKind::ExistsIn => exists_in_valid_values,
        ValidationKind::AtLeastOneNotEmpty => at_least_one_not_empty,
        ValidationKind::MaxLength => within_max_length,
        ValidationKind::Integer => integer,
        ValidationKind::PositiveInteger => positive_integer,
        ValidationKind::Decimal => |ctx| text_check(ctx, is_valid_decimal),
        ValidationKind::PositiveDecimal => |ctx| number_check(ctx, |n| n >= 0.0),
        ValidationKind::NegativeDecimal => |ctx| number_check(ctx, |n| n < 0.0),
        ValidationKind::Numeric => |ctx| number_check(ctx, |_| true),
        ValidationKind::Boolean => boolean,
        ValidationKind::Date => |ctx| text_check(ctx, try_parse_as_date),
        ValidationKind::Mail => |ctx| text_check(ctx, is_valid_email),
        ValidationKind::Currency => |ctx| text_check(ctx, is_valid_us_currency),
        ValidationKind::NumericArray => numeric_array,
        ValidationKind::MailArray => mail_array,
        ValidationKind::MinValue => min_value,
        ValidationKind::MaxValue => max_value,
        ValidationKind::Shorthand => |ctx| text_check(ctx, is_valid_shorthand),
        ValidationKind::PhoneNumber => |ctx| text_check(ctx, is_valid_phone_number),
        ValidationKind::PostalCode => |ctx| text_check(ctx, is_valid_postal_code),
        ValidationKind::Percentage => |ctx| text_check(ctx, is_valid_percentage),
        ValidationKind::InventoryName => |ctx| text_check(ctx, has_no_dash_hyphen_or_dot),
        ValidationKind::TimeZone => |ctx| text_check(ctx, is_valid_time_zone),
        ValidationKind::Url => |ctx| text_check(ctx, is_valid_url),
    };

    Validator {
        predicate,
        error_token: kind.error_token(),
    }
}

// ── Predicates ───────────────────────────────────────────────────────

fn text_check(ctx: &ValidatorContext<'_>, check: fn(&str) -> bool) -> bool {
    is_blank(ctx.field_value) || check(&cell_text(ctx.field_value))
}

fn number_check(ctx: &ValidatorContext<'_>, check: fn(f64) -> bool) -> bool {
    is_blank(ctx.field_value) || to_number(ctx.field_value).is_some_and(check)
}

fn not_empty(ctx: &ValidatorContext<'_>) -> bool {
    !is_blank(ctx.field_value)
}

fn exists_in_valid_values(ctx: &ValidatorContext<'_>) -> bool {
    if is_blank(ctx.field_value) {
        return true;
    }
    match ctx.rule.valid_values {
        Some(valid_values) => exists_in(&valid_values, &cell_text(ctx.field_value)),
        None => false,
    }
}

fn at_least_one_not_empty(ctx: &ValidatorContext<'_>) -> bool {
    ctx.field_values
        .unwrap_or_default()
        .iter()
        .any(|value| !is_blank(*value))
}

fn within_max_length(ctx: &ValidatorContext<'_>) -> bool {
    let text = cell_text(ctx.field_value);
    let trimmed = text.trim();
    match ctx.rule.max_length {
        Some(max_length) => trimmed.is_empty() || trimmed.chars().count() <= max_length,
        None => true,
    }
}

fn integer(ctx: &ValidatorContext<'_>) -> bool {
    is_blank(ctx.field_value) || is_integer(ctx.field_value)
}

fn positive_integer(ctx: &ValidatorContext<'_>) -> bool {
    is_blank(ctx.field_value)
        || (is_integer(ctx.field_value) && to_number(ctx.field_value).is_some_and(|n| n >= 0.0))
}

fn boolean(ctx: &ValidatorContext<'_>) -> bool {
    match ctx.field_value {
        Some(Value::Bool(_)) => true,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n == 0.0 || n == 1.0),
        value if is_blank(value) => true,
        Some(Value::String(s)) => {
            matches!(s.to_lowercase().as_str(), "true" | "false" | "x")
        }
        _ => false,
    }
}

fn numeric_array(ctx: &ValidatorContext<'_>) -> bool {
    if is_blank(ctx.field_value) {
        return true;
    }
    cell_text(ctx.field_value)
        .split(',')
        .all(|element| !element.trim().is_empty() && to_number(Some(&Value::String(element.to_string()))).is_some())
}

fn mail_array(ctx: &ValidatorContext<'_>) -> bool {
    convert_string_value_to_array(&cell_text(ctx.field_value))
        .iter()
        .all(|mail| is_valid_email(mail))
}

fn min_value(ctx: &ValidatorContext<'_>) -> bool {
    if is_blank(ctx.field_value) {
        return true;
    }
    match (to_number(ctx.field_value), ctx.rule.min_value) {
        (Some(value), Some(min)) => is_valid_minimum_value(value, min),
        (None, Some(_)) => false,
        (_, None) => true,
    }
}

fn max_value(ctx: &ValidatorContext<'_>) -> bool {
    if is_blank(ctx.field_value) {
        return true;
    }
    match (to_number(ctx.field_value), ctx.rule.max_value) {
        (Some(value), Some(max)) => value <= max,
        (None, Some(_)) => false,
        (_, None) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dal_types::EnumMapping;
    use serde_json::json;

    const TYPES: EnumMapping = EnumMapping(&[("A", "Valid Type1"), ("B", "Valid Type2")]);

    fn passes(kind: ValidationKind, rule: FieldRule, value: Value) -> bool {
        let ctx = ValidatorContext {
            field_value: Some(&value),
            field_values: None,
            rule: &rule,
        };
        (validator(kind).predicate)(&ctx)
    }

    fn simple(kind: ValidationKind, value: Value) -> bool {
        passes(kind, FieldRule::new("field", &[]), value)
    }

    #[test]
    fn registry_pairs_kinds_with_tokens() {
        assert_eq!(validator(ValidationKind::NotEmpty).error_token, "FIELD_REQUIRED");
        assert_eq!(validator(ValidationKind::MaxLength).error_token, "INVALID_LENGTH");
        assert_eq!(validator(ValidationKind::Url).error_token, "INVALID_URL");
    }

    #[test]
    fn not_empty_rejects_whitespace_and_null() {
        assert!(!simple(ValidationKind::NotEmpty, json!("  ")));
        assert!(!simple(ValidationKind::NotEmpty, Value::Null));
        assert!(simple(ValidationKind::NotEmpty, json!("name")));
        assert!(simple(ValidationKind::NotEmpty, json!(0)));
    }

    #[test]
    fn exists_in_is_list_aware_and_case_insensitive() {
        let rule = FieldRule::new("type", &[]).valid_values(TYPES);
        assert!(passes(ValidationKind::ExistsIn, rule, json!("Valid Type2, Valid Type1")));
        assert!(passes(ValidationKind::ExistsIn, rule, json!("valid type1")));
        assert!(passes(ValidationKind::ExistsIn, rule, json!("b")));
        assert!(passes(ValidationKind::ExistsIn, rule, json!("")));
        assert!(!passes(ValidationKind::ExistsIn, rule, json!("Valid Type")));
        assert!(!passes(ValidationKind::ExistsIn, rule, json!("Valid Type, Valid Type2")));
    }

    #[test]
    fn max_length_counts_trimmed_characters() {
        let rule = FieldRule::new("name", &[]).max_length(5);
        assert!(passes(ValidationKind::MaxLength, rule, json!(" name ")));
        assert!(!passes(ValidationKind::MaxLength, rule, json!("incorrectName")));
        assert!(passes(ValidationKind::MaxLength, FieldRule::new("name", &[]), json!("anything")));
    }

    #[test]
    fn numeric_family() {
        assert!(simple(ValidationKind::Numeric, json!("-5.5")));
        assert!(!simple(ValidationKind::Numeric, json!("five")));
        assert!(!simple(ValidationKind::Integer, json!("6.5")));
        assert!(!simple(ValidationKind::PositiveInteger, json!("-1")));
        assert!(simple(ValidationKind::PositiveInteger, json!("5")));
        assert!(simple(ValidationKind::PositiveDecimal, json!("0")));
        assert!(!simple(ValidationKind::PositiveDecimal, json!("-5.5")));
        assert!(simple(ValidationKind::NegativeDecimal, json!("-5.5")));
        assert!(!simple(ValidationKind::NegativeDecimal, json!("6.5")));
        assert!(!simple(ValidationKind::NegativeDecimal, json!("abc")));
    }

    #[test]
    fn boolean_accepts_flags() {
        for valid in [json!(true), json!(0), json!(1), json!(""), json!("TRUE"), json!("x"), json!("False")] {
            assert!(simple(ValidationKind::Boolean, valid.clone()), "{valid}");
        }
        assert!(!simple(ValidationKind::Boolean, json!("incorrectName")));
        assert!(!simple(ValidationKind::Boolean, json!(2)));
    }

    #[test]
    fn arrays() {
        assert!(simple(ValidationKind::NumericArray, json!("2, -4, 10, 12, 24")));
        assert!(!simple(ValidationKind::NumericArray, json!("2, \"a\", 10, \"b\", 24")));
        assert!(simple(ValidationKind::MailArray, json!("a@b.com, c@d.com")));
        assert!(simple(ValidationKind::MailArray, json!("")));
        assert!(!simple(ValidationKind::MailArray, json!("a@b.com, nope")));
    }

    #[test]
    fn bounds_are_inclusive() {
        let min = FieldRule::new("value", &[]).min_value(2.0);
        assert!(passes(ValidationKind::MinValue, min, json!(2)));
        assert!(!passes(ValidationKind::MinValue, min, json!(1)));
        assert!(!passes(ValidationKind::MinValue, min, json!("abc")));
        let max = FieldRule::new("value", &[]).max_value(5.0);
        assert!(passes(ValidationKind::MaxValue, max, json!("5")));
        assert!(!passes(ValidationKind::MaxValue, max, json!(6)));
    }

    #[test]
    fn at_least_one_not_empty_reads_all_values() {
        let rule = FieldRule::group(&["owner", "ownerGroup"], &[ValidationKind::AtLeastOneNotEmpty]);
        let empty = json!("");
        let name = json!("Name");
        let all_blank = [Some(&empty), None];
        let one_set = [Some(&empty), Some(&name)];
        let check = |values: &[Option<&Value>]| {
            (validator(ValidationKind::AtLeastOneNotEmpty).predicate)(&ValidatorContext {
                field_value: None,
                field_values: Some(values),
                rule: &rule,
            })
        };
        assert!(!check(&all_blank));
        assert!(check(&one_set));
    }
}
