//! Programs sheet.
//!
//! A program ties a marketing source and path to the team and property that
//! receive its communications. Teams, properties, sources and campaigns are
//! resolved through prerequisites; the checks here cover the rules that span
//! several columns of a row, or several rows of the sheet.

use std::collections::HashMap;

use super::{column_length, is_set, text};
use crate::import::coercion::{convert_string_value_to_array, split_cell_by_comma};
use crate::import::pipeline::ImportRules;
use crate::import::prerequisite::Prerequisite;
use crate::types::RowData;
use crate::validation::lexical::{is_valid_email, is_valid_phone_number, try_parse_as_date};
use crate::validation::rules::{FieldRule, InvalidField, ValidationKind, ValidationKind::*};

pub const PROGRAM_FALLBACK_NONE: &str = "NONE";

pub const INVALID_END_DATE: &str = "INVALID_END_DATE";
pub const REACTIVATED_PROGRAM: &str = "REACTIVATED_PROGRAM";
pub const EMAIL_ADDRESS_ASSIGNED_MORE_THAN_ONCE: &str = "EMAIL_ADDRESS_ASSIGNED_MORE_THAN_ONCE";
pub const EMAIL_ADDRESS_ALREADY_IN_DB: &str = "EMAIL_ADDRESS_ALREADY_IN_DB";
pub const EMAIL_OR_PHONE_NOT_PRESENT: &str = "EMAIL_OR_PHONE_NOT_PRESENT";
pub const REQUIRED_MATCHING_PATH: &str = "REQUIRED_MATCHING_PATH_FLAG_OR_DEFAULT";
pub const REQUIRED_MATCHING_SOURCE: &str = "REQUIRED_MATCHING_SOURCE_FLAG_OR_DEFAULT";
pub const DEFAULT_PATH_ERROR: &str = "PATH_SAME_AS_DEFAULT_MATCH_PATH";
pub const DEFAULT_SOURCE_ERROR: &str = "SOURCE_SAME_AS_DEFAULT_MATCH_SOURCE";
pub const REQUIRED_FORWARDING_EMAIL: &str = "REQUIRED_EXTERNAL_TARGET_FOR_EMAILS";
pub const REQUIRED_FORWARDING_PHONE: &str = "REQUIRED_EXTERNAL_TARGET_FOR_CALLS";
pub const REQUIRED_FORWARDING_SMS: &str = "REQUIRED_EXTERNAL_TARGET_FOR_SMS";
pub const INVALID_FIELD: &str = "INVALID_FIELD";

const DIRECT_EMAIL: &str = "directEmailIdentifier";
const DIRECT_PHONE: &str = "directPhoneIdentifier";
const FORWARD_EMAIL: &str = "forwardEmailToExternalTarget";
const FORWARD_CALL: &str = "forwardCallToExternalTarget";
const FORWARD_SMS: &str = "forwardSMSToExternalTarget";

const fn name_rule(field: &'static str, validations: &'static [ValidationKind]) -> FieldRule {
    FieldRule::new(field, validations).max_length(column_length::NAME)
}

const REQUIRED_NAME: &[ValidationKind] = &[NotEmpty, MaxLength];
const OPTIONAL_NAME: &[ValidationKind] = &[MaxLength];

pub const FIELDS: &[FieldRule] = &[
    name_rule("name", REQUIRED_NAME),
    name_rule("displayName", REQUIRED_NAME),
    name_rule("reportingDisplayName", REQUIRED_NAME),
    name_rule("path", REQUIRED_NAME),
    name_rule("campaign", OPTIONAL_NAME),
    FieldRule::new("description", &[MaxLength]).max_length(column_length::DESCRIPTION),
    name_rule("team", REQUIRED_NAME),
    name_rule("onSiteLeasingTeam", OPTIONAL_NAME),
    name_rule("primaryProperty", REQUIRED_NAME),
    name_rule("source", REQUIRED_NAME),
    name_rule(DIRECT_EMAIL, OPTIONAL_NAME),
    FieldRule::new("outsideDedicatedEmails", &[MailArray]),
    name_rule("displayEmail", OPTIONAL_NAME),
    FieldRule::new(DIRECT_PHONE, &[MaxLength]).max_length(column_length::DESCRIPTION),
    FieldRule::new("displayPhoneNumber", &[MaxLength]).max_length(column_length::DESCRIPTION),
    FieldRule::new("displayUrl", &[MaxLength, Url]).max_length(column_length::WEB_SITE),
    name_rule("voiceMessage", OPTIONAL_NAME),
    FieldRule::new("requireMatchingPathFlag", &[Boolean]),
    name_rule("defaultMatchingPath", OPTIONAL_NAME),
    FieldRule::new("requireMatchingSourceFlag", &[Boolean]),
    name_rule("defaultMatchingSource", OPTIONAL_NAME),
    FieldRule::new("endDate", &[Date]),
    FieldRule::new("forwardingEnabledFlag", &[Boolean]),
    FieldRule::new(FORWARD_EMAIL, &[MailArray]),
    FieldRule::new(FORWARD_CALL, &[MaxLength]).max_length(column_length::PHONE),
    FieldRule::new(FORWARD_SMS, &[MaxLength]).max_length(column_length::DESCRIPTION),
    FieldRule::new("enableBotResponseOnCommunications", &[Boolean]),
    FieldRule::new("activatePaymentPlan", &[Boolean]),
    FieldRule::new("programFallback", &[MaxLength]).max_length(column_length::DESCRIPTION),
];

pub const PREREQUISITES: &[Prerequisite] = &[
    Prerequisite::new("team", "name", "teams", "team_id"),
    Prerequisite::new("onSiteLeasingTeam", "name", "teams", "on_site_leasing_team_id"),
    Prerequisite::new("primaryProperty", "name", "properties", "primary_property_id"),
    Prerequisite::new("source", "name", "sources", "source_id"),
    Prerequisite::new("campaign", "name", "campaigns", "campaign_id"),
    Prerequisite::new("defaultMatchingSource", "name", "sources", "default_matching_source_id"),
];

pub const RULES: ImportRules<'static> = ImportRules::new(FIELDS, PREREQUISITES);

/// Normalized form of a direct email identifier: trimmed, lower case and
/// without inner spaces.
pub fn sanitize_direct_email_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

// ── Sheet-wide checks ────────────────────────────────────────────────

/// Direct email identifiers used by more than one row of the sheet.
pub fn duplicated_direct_emails<'a>(rows: impl IntoIterator<Item = &'a RowData>) -> Vec<InvalidField> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();
    for data in rows {
        let email = sanitize_direct_email_identifier(&text(data, DIRECT_EMAIL));
        if email.is_empty() {
            continue;
        }
        let count = counts.entry(email.clone()).or_default();
        *count += 1;
        if *count == 2 {
            order.push(email);
        }
    }
    order
        .into_iter()
        .map(|email| {
            InvalidField::custom(DIRECT_EMAIL, format!("{EMAIL_ADDRESS_ASSIGNED_MORE_THAN_ONCE}: {email}"))
        })
        .collect()
}

// ── Row checks ───────────────────────────────────────────────────────

/// What the importer knows about the program already stored under this
/// row's name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistingProgram {
    pub has_end_date: bool,
}

pub fn validate_email_or_phone(data: &RowData) -> Vec<InvalidField> {
    if is_set(data, DIRECT_EMAIL) || is_set(data, DIRECT_PHONE) {
        return Vec::new();
    }
    vec![InvalidField::custom(DIRECT_PHONE, EMAIL_OR_PHONE_NOT_PRESENT)]
}

/// A new program may not take a direct email another program already owns.
/// `owner` is the name of the stored program using the identifier, if any.
pub fn validate_direct_email_owner(data: &RowData, owner: Option<&str>) -> Vec<InvalidField> {
    match owner {
        Some(owner) if !owner.eq_ignore_ascii_case(&text(data, "name")) => {
            vec![InvalidField::custom(DIRECT_EMAIL, EMAIL_ADDRESS_ALREADY_IN_DB)]
        }
        _ => Vec::new(),
    }
}

pub fn validate_end_date(data: &RowData, existing: &ExistingProgram) -> Vec<InvalidField> {
    let end_date = text(data, "endDate");
    if end_date.is_empty() {
        if existing.has_end_date {
            return vec![InvalidField::custom("endDate", REACTIVATED_PROGRAM)];
        }
        return Vec::new();
    }
    if !try_parse_as_date(&end_date) {
        return vec![InvalidField::custom("endDate", INVALID_END_DATE)];
    }
    Vec::new()
}

pub fn validate_match_config(data: &RowData) -> Vec<InvalidField> {
    let mut invalid = Vec::new();
    let default_path = text(data, "defaultMatchingPath");
    let default_source = text(data, "defaultMatchingSource");

    if !is_set(data, "requireMatchingPathFlag") && default_path.is_empty() {
        invalid.push(InvalidField::custom("requireMatchingPathFlag", REQUIRED_MATCHING_PATH));
    }
    if !is_set(data, "requireMatchingSourceFlag") && default_source.is_empty() {
        invalid.push(InvalidField::custom("requireMatchingSourceFlag", REQUIRED_MATCHING_SOURCE));
    }
    if !default_source.is_empty() && text(data, "source") == default_source {
        invalid.push(InvalidField::custom("defaultMatchingSource", DEFAULT_SOURCE_ERROR));
    }
    if !default_path.is_empty() && text(data, "path") == default_path {
        invalid.push(InvalidField::custom("defaultMatchingPath", DEFAULT_PATH_ERROR));
    }
    invalid
}

/// Forwarding needs an email, a call and an SMS target. Several SMS targets
/// must all be emails; a single one may be a phone number or an email.
pub fn validate_forwarding(data: &RowData) -> Vec<InvalidField> {
    if !is_set(data, "forwardingEnabledFlag") {
        return Vec::new();
    }
    let mut invalid = Vec::new();
    let emails = convert_string_value_to_array(&text(data, FORWARD_EMAIL));
    let call = text(data, FORWARD_CALL);
    let sms = split_cell_by_comma(data.get(FORWARD_SMS));

    if emails.is_empty() {
        invalid.push(InvalidField::custom(FORWARD_EMAIL, REQUIRED_FORWARDING_EMAIL));
    }
    if call.is_empty() {
        invalid.push(InvalidField::custom(FORWARD_CALL, REQUIRED_FORWARDING_PHONE));
    }
    if sms.is_empty() {
        invalid.push(InvalidField::custom(FORWARD_SMS, REQUIRED_FORWARDING_SMS));
    }
    if !is_valid_phone_number(&call) {
        invalid.push(InvalidField::custom(FORWARD_CALL, INVALID_FIELD));
    }

    let name = text(data, "name");
    match sms.as_slice() {
        [] => {}
        [single] => {
            if !is_valid_phone_number(single) && !is_valid_email(single) {
                invalid.push(InvalidField::custom(
                    FORWARD_SMS,
                    format!("{name}-{INVALID_FIELD}-The value provided is not a valid phone number or email address: {single}"),
                ));
            }
        }
        many => {
            let not_emails: Vec<&str> = many
                .iter()
                .filter(|target| !is_valid_email(target))
                .map(String::as_str)
                .collect();
            if !not_emails.is_empty() {
                invalid.push(InvalidField::custom(
                    FORWARD_SMS,
                    format!(
                        "{name}-{INVALID_FIELD}-The following values are not valid email addresses: {}",
                        not_emails.join(", ")
                    ),
                ));
            }
        }
    }
    invalid
}

/// A deactivated program must fall back to another program or to `NONE`.
/// `fallback_exists` tells whether the named fallback program is stored.
pub fn validate_fallback(data: &RowData, fallback_exists: bool) -> Vec<InvalidField> {
    let name = text(data, "name");
    let fallback = text(data, "programFallback");
    let mut invalid = Vec::new();

    if is_set(data, "endDate") && fallback.is_empty() {
        invalid.push(InvalidField::custom(
            "programFallback",
            format!("Deactivated program {name} needs to fallback to another active program or to {PROGRAM_FALLBACK_NONE}"),
        ));
    }
    if !fallback.is_empty() && fallback != PROGRAM_FALLBACK_NONE && !fallback_exists {
        invalid.push(InvalidField::custom(
            "programFallback",
            format!("Deactivated program {name} has invalid program fallback {fallback}"),
        ));
    }
    invalid
}

/// The row checks that need no database access.
pub fn additional_validations(data: &RowData, existing: &ExistingProgram) -> Vec<InvalidField> {
    let mut invalid = validate_email_or_phone(data);
    invalid.extend(validate_end_date(data, existing));
    invalid.extend(validate_match_config(data));
    invalid.extend(validate_forwarding(data));
    invalid
}
