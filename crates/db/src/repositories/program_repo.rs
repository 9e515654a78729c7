//! Repository for the `programs` table.

use leasehold_core::types::DbId;
use sqlx::PgPool;

use crate::models::program::{CreateProgram, Program};

/// Column list for the `programs` table.
const COLUMNS: &str = "id, name, display_name, reporting_display_name, path, description, \
    team_id, on_site_leasing_team_id, primary_property_id, source_id, campaign_id, \
    default_matching_source_id, direct_email_identifier, outside_dedicated_emails, \
    display_email, direct_phone_identifier, display_phone_number, display_url, voice_message, \
    require_matching_path, default_matching_path, require_matching_source, end_date, \
    program_fallback_id, selected_property_ids, metadata, created_at, updated_at";

/// Provides data access for programs.
pub struct ProgramRepo;

impl ProgramRepo {
    /// Insert a program or update the one with the same name.
    pub async fn upsert(pool: &PgPool, input: &CreateProgram) -> Result<Program, sqlx::Error> {
        let query = format!(
            "INSERT INTO programs (name, display_name, reporting_display_name, path, \
                description, team_id, on_site_leasing_team_id, primary_property_id, source_id, \
                campaign_id, default_matching_source_id, direct_email_identifier, \
                outside_dedicated_emails, display_email, direct_phone_identifier, \
                display_phone_number, display_url, voice_message, require_matching_path, \
                default_matching_path, require_matching_source, end_date, program_fallback_id, \
                selected_property_ids, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                $17, $18, $19, $20, $21, $22, $23, $24, $25) \
             ON CONFLICT (name) \
             DO UPDATE SET display_name = EXCLUDED.display_name, \
                           reporting_display_name = EXCLUDED.reporting_display_name, \
                           path = EXCLUDED.path, \
                           description = EXCLUDED.description, \
                           team_id = EXCLUDED.team_id, \
                           on_site_leasing_team_id = EXCLUDED.on_site_leasing_team_id, \
                           primary_property_id = EXCLUDED.primary_property_id, \
                           source_id = EXCLUDED.source_id, \
                           campaign_id = EXCLUDED.campaign_id, \
                           default_matching_source_id = EXCLUDED.default_matching_source_id, \
                           direct_email_identifier = EXCLUDED.direct_email_identifier, \
                           outside_dedicated_emails = EXCLUDED.outside_dedicated_emails, \
                           display_email = EXCLUDED.display_email, \
                           direct_phone_identifier = EXCLUDED.direct_phone_identifier, \
                           display_phone_number = EXCLUDED.display_phone_number, \
                           display_url = EXCLUDED.display_url, \
                           voice_message = EXCLUDED.voice_message, \
                           require_matching_path = EXCLUDED.require_matching_path, \
                           default_matching_path = EXCLUDED.default_matching_path, \
                           require_matching_source = EXCLUDED.require_matching_source, \
                           end_date = EXCLUDED.end_date, \
                           program_fallback_id = EXCLUDED.program_fallback_id, \
                           selected_property_ids = EXCLUDED.selected_property_ids, \
                           metadata = EXCLUDED.metadata, \
                           updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(&input.name)
            .bind(&input.display_name)
            .bind(&input.reporting_display_name)
            .bind(&input.path)
            .bind(&input.description)
            .bind(input.team_id)
            .bind(input.on_site_leasing_team_id)
            .bind(input.primary_property_id)
            .bind(input.source_id)
            .bind(input.campaign_id)
            .bind(input.default_matching_source_id)
            .bind(&input.direct_email_identifier)
            .bind(&input.outside_dedicated_emails)
            .bind(&input.display_email)
            .bind(&input.direct_phone_identifier)
            .bind(&input.display_phone_number)
            .bind(&input.display_url)
            .bind(&input.voice_message)
            .bind(input.require_matching_path)
            .bind(&input.default_matching_path)
            .bind(input.require_matching_source)
            .bind(input.end_date)
            .bind(input.program_fallback_id)
            .bind(&input.selected_property_ids)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// Find a program by name, ignoring case.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE lower(name) = lower($1)");
        sqlx::query_as::<_, Program>(&query)
            .bind(name.trim())
            .fetch_optional(pool)
            .await
    }

    /// Name of the program already using a direct email identifier.
    pub async fn direct_email_owner(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM programs WHERE lower(direct_email_identifier) = lower($1)",
        )
        .bind(identifier)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_id_by_name(pool: &PgPool, name: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM programs WHERE lower(name) = lower($1)")
            .bind(name.trim())
            .fetch_optional(pool)
            .await
    }
}
