//! Programs sheet importer.

use std::collections::HashMap;

use async_trait::async_trait;
use leasehold_core::import::coercion::{
    convert_string_value_to_array, date_to_persist, flag_or_false, split_cell_by_comma,
    text_to_persist,
};
use leasehold_core::import::{validate, EntityError, ImportHandler};
use leasehold_core::inventory::program::{
    self, sanitize_direct_email_identifier, ExistingProgram, PROGRAM_FALLBACK_NONE,
};
use leasehold_core::inventory::{is_set, text};
use leasehold_core::spreadsheet::PROGRAMS;
use leasehold_core::types::{DbId, RowData};
use leasehold_core::validation::rules::ELEMENT_DOESNT_EXIST;
use leasehold_core::validation::InvalidField;
use leasehold_db::error::to_entity_error;
use leasehold_db::models::program::{CreateProgram, Program};
use leasehold_db::repositories::{PgLookupSource, ProgramRepo, PropertyRepo};
use leasehold_db::DbPool;
use serde_json::{json, Value};

use super::{required_id, resolved_id, sheet_rows};
use crate::error::AppResult;
use crate::report::ImportOutcome;

/// Ids a row's `custom_check` resolved outside the prerequisite tables.
#[derive(Debug, Clone, Default)]
struct ResolvedRefs {
    program_fallback_id: Option<DbId>,
    selected_property_ids: Vec<DbId>,
}

struct ProgramHandler<'a> {
    pool: &'a DbPool,
    sheet: Vec<RowData>,
    resolved: HashMap<usize, ResolvedRefs>,
    saved: Vec<Program>,
}

impl ProgramHandler<'_> {
    async fn existing(&self, name: &str) -> Result<ExistingProgram, EntityError> {
        let program = ProgramRepo::find_by_name(self.pool, name)
            .await
            .map_err(to_entity_error)?;
        Ok(ExistingProgram {
            has_end_date: program.is_some_and(|p| p.end_date.is_some()),
        })
    }

    async fn check_direct_email(&self, data: &RowData) -> Result<Vec<InvalidField>, EntityError> {
        let identifier = sanitize_direct_email_identifier(&text(data, "directEmailIdentifier"));
        if identifier.is_empty() {
            return Ok(Vec::new());
        }
        let owner = ProgramRepo::direct_email_owner(self.pool, &identifier)
            .await
            .map_err(to_entity_error)?;
        Ok(program::validate_direct_email_owner(data, owner.as_deref()))
    }

    async fn check_fallback(
        &self,
        data: &RowData,
    ) -> Result<(Vec<InvalidField>, Option<DbId>), EntityError> {
        let fallback = text(data, "programFallback");
        let fallback_id = if fallback.is_empty() || fallback == PROGRAM_FALLBACK_NONE {
            None
        } else {
            ProgramRepo::find_id_by_name(self.pool, &fallback)
                .await
                .map_err(to_entity_error)?
        };
        Ok((program::validate_fallback(data, fallback_id.is_some()), fallback_id))
    }

    async fn check_selected_properties(
        &self,
        data: &RowData,
    ) -> Result<(Vec<InvalidField>, Vec<DbId>), EntityError> {
        let names = split_cell_by_comma(data.get("selectedProperties"));
        if names.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        let ids = PropertyRepo::ids_by_names(self.pool, &names)
            .await
            .map_err(to_entity_error)?;

        let mut distinct: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
        distinct.sort_unstable();
        distinct.dedup();
        if ids.len() < distinct.len() {
            let invalid = InvalidField::custom(
                "selectedProperties",
                format!("{ELEMENT_DOESNT_EXIST}: {}", names.join(", ")),
            );
            return Ok((vec![invalid], ids));
        }
        Ok((Vec::new(), ids))
    }
}

/// Forwarding targets, bot and payment-plan switches and analytics ids.
fn metadata(data: &RowData) -> Value {
    json!({
        "commsForwardingData": {
            "forwardingEnabled": flag_or_false(data.get("forwardingEnabledFlag")),
            "forwardEmailToExternalTarget":
                convert_string_value_to_array(&text(data, "forwardEmailToExternalTarget")),
            "forwardCallToExternalTarget": text_to_persist(data.get("forwardCallToExternalTarget")),
            "forwardSMSToExternalTarget": split_cell_by_comma(data.get("forwardSMSToExternalTarget")),
        },
        "enableBotResponseOnCommunications":
            flag_or_false(data.get("enableBotResponseOnCommunications")),
        "activatePaymentPlan": flag_or_false(data.get("activatePaymentPlan")),
        "gaIds": split_cell_by_comma(data.get("gaIds")),
        "gaActions": split_cell_by_comma(data.get("gaActions")),
    })
}

fn to_create(data: &RowData, refs: ResolvedRefs) -> Result<CreateProgram, EntityError> {
    let direct_email = sanitize_direct_email_identifier(&text(data, "directEmailIdentifier"));
    Ok(CreateProgram {
        name: text(data, "name"),
        display_name: text(data, "displayName"),
        reporting_display_name: text(data, "reportingDisplayName"),
        path: text(data, "path"),
        description: text_to_persist(data.get("description")),
        team_id: required_id(data, "team_id")?,
        on_site_leasing_team_id: resolved_id(data, "on_site_leasing_team_id"),
        primary_property_id: required_id(data, "primary_property_id")?,
        source_id: required_id(data, "source_id")?,
        campaign_id: resolved_id(data, "campaign_id"),
        default_matching_source_id: resolved_id(data, "default_matching_source_id"),
        direct_email_identifier: (!direct_email.is_empty()).then_some(direct_email),
        outside_dedicated_emails: convert_string_value_to_array(&text(data, "outsideDedicatedEmails")),
        display_email: text_to_persist(data.get("displayEmail")),
        direct_phone_identifier: text_to_persist(data.get("directPhoneIdentifier")),
        display_phone_number: text_to_persist(data.get("displayPhoneNumber")),
        display_url: text_to_persist(data.get("displayUrl")),
        voice_message: text_to_persist(data.get("voiceMessage")),
        require_matching_path: is_set(data, "requireMatchingPathFlag"),
        default_matching_path: text_to_persist(data.get("defaultMatchingPath")),
        require_matching_source: is_set(data, "requireMatchingSourceFlag"),
        end_date: date_to_persist(data.get("endDate")),
        program_fallback_id: refs.program_fallback_id,
        selected_property_ids: refs.selected_property_ids,
        metadata: metadata(data),
    })
}

#[async_trait]
impl ImportHandler for ProgramHandler<'_> {
    async fn spreadsheet_check(&mut self) -> Result<Vec<InvalidField>, EntityError> {
        Ok(program::duplicated_direct_emails(self.sheet.iter()))
    }

    async fn custom_check(
        &mut self,
        data: &mut RowData,
        index: usize,
    ) -> Result<Vec<InvalidField>, EntityError> {
        let existing = self.existing(&text(data, "name")).await?;
        let mut invalid = program::additional_validations(data, &existing);
        invalid.extend(self.check_direct_email(data).await?);

        let (fallback_invalid, program_fallback_id) = self.check_fallback(data).await?;
        invalid.extend(fallback_invalid);
        let (selected_invalid, selected_property_ids) = self.check_selected_properties(data).await?;
        invalid.extend(selected_invalid);

        self.resolved.insert(
            index,
            ResolvedRefs {
                program_fallback_id,
                selected_property_ids,
            },
        );
        Ok(invalid)
    }

    async fn on_valid_entity(&mut self, data: &RowData, index: usize) -> Result<(), EntityError> {
        let refs = self.resolved.remove(&index).unwrap_or_default();
        let program = ProgramRepo::upsert(self.pool, &to_create(data, refs)?)
            .await
            .map_err(to_entity_error)?;
        self.saved.push(program);
        Ok(())
    }
}

/// Upsert programs on name.
pub async fn import_programs(pool: &DbPool, rows: Vec<RowData>) -> AppResult<ImportOutcome> {
    let rows = sheet_rows(rows, &PROGRAMS);
    let source = PgLookupSource::new(pool.clone());
    let mut handler = ProgramHandler {
        pool,
        sheet: rows.iter().map(|row| row.data.clone()).collect(),
        resolved: HashMap::new(),
        saved: Vec::new(),
    };

    let invalid_fields = validate(rows, &program::RULES, &source, &mut handler, Some(&PROGRAMS)).await?;
    Ok(ImportOutcome::new(invalid_fields, &handler.saved)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> RowData {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn resolved_program() -> RowData {
        row(&[
            ("name", json!("parkmerced-website")),
            ("displayName", json!("Parkmerced website")),
            ("reportingDisplayName", json!("Website")),
            ("path", json!("direct")),
            ("team_id", json!(1)),
            ("primary_property_id", json!(2)),
            ("source_id", json!(3)),
            ("campaign_id", Value::Null),
            ("directEmailIdentifier", json!(" Park Merced ")),
            ("outsideDedicatedEmails", json!("a@x.com, b@x.com, a@x.com")),
            ("requireMatchingPathFlag", json!(true)),
            ("forwardingEnabledFlag", json!(true)),
            ("forwardSMSToExternalTarget", json!("a@x.com, b@x.com")),
            ("gaIds", json!("UA-1, UA-2")),
        ])
    }

    #[test]
    fn rows_map_to_upsert_input() {
        let refs = ResolvedRefs {
            program_fallback_id: Some(9),
            selected_property_ids: vec![2, 4],
        };
        let input = to_create(&resolved_program(), refs).unwrap();

        assert_eq!(input.team_id, 1);
        assert_eq!(input.campaign_id, None);
        assert_eq!(input.direct_email_identifier.as_deref(), Some("parkmerced"));
        assert_eq!(input.outside_dedicated_emails, vec!["a@x.com", "b@x.com"]);
        assert!(input.require_matching_path);
        assert!(!input.require_matching_source);
        assert_eq!(input.program_fallback_id, Some(9));
        assert_eq!(input.selected_property_ids, vec![2, 4]);
    }

    #[test]
    fn metadata_collects_forwarding_and_analytics() {
        let metadata = metadata(&resolved_program());
        assert_eq!(metadata["commsForwardingData"]["forwardingEnabled"], json!(true));
        assert_eq!(
            metadata["commsForwardingData"]["forwardSMSToExternalTarget"],
            json!(["a@x.com", "b@x.com"])
        );
        assert_eq!(metadata["commsForwardingData"]["forwardCallToExternalTarget"], Value::Null);
        assert_eq!(metadata["gaIds"], json!(["UA-1", "UA-2"]));
        assert_eq!(metadata["activatePaymentPlan"], json!(false));
    }

    #[test]
    fn missing_required_ids_are_errors() {
        let mut data = resolved_program();
        data.remove("source_id");
        assert!(to_create(&data, ResolvedRefs::default()).is_err());
    }
}
