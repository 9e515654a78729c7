//! Program entity model and DTOs.

use chrono::NaiveDate;
use leasehold_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A program row from the `programs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub reporting_display_name: String,
    pub path: String,
    pub description: Option<String>,
    pub team_id: DbId,
    pub on_site_leasing_team_id: Option<DbId>,
    pub primary_property_id: DbId,
    pub source_id: DbId,
    pub campaign_id: Option<DbId>,
    pub default_matching_source_id: Option<DbId>,
    pub direct_email_identifier: Option<String>,
    pub outside_dedicated_emails: Vec<String>,
    pub display_email: Option<String>,
    pub direct_phone_identifier: Option<String>,
    pub display_phone_number: Option<String>,
    pub display_url: Option<String>,
    pub voice_message: Option<String>,
    pub require_matching_path: bool,
    pub default_matching_path: Option<String>,
    pub require_matching_source: bool,
    pub end_date: Option<NaiveDate>,
    pub program_fallback_id: Option<DbId>,
    pub selected_property_ids: Vec<DbId>,
    /// Forwarding targets, bot/payment-plan switches and analytics ids.
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a program on `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProgram {
    pub name: String,
    pub display_name: String,
    pub reporting_display_name: String,
    pub path: String,
    pub description: Option<String>,
    pub team_id: DbId,
    pub on_site_leasing_team_id: Option<DbId>,
    pub primary_property_id: DbId,
    pub source_id: DbId,
    pub campaign_id: Option<DbId>,
    pub default_matching_source_id: Option<DbId>,
    pub direct_email_identifier: Option<String>,
    pub outside_dedicated_emails: Vec<String>,
    pub display_email: Option<String>,
    pub direct_phone_identifier: Option<String>,
    pub display_phone_number: Option<String>,
    pub display_url: Option<String>,
    pub voice_message: Option<String>,
    pub require_matching_path: bool,
    pub default_matching_path: Option<String>,
    pub require_matching_source: bool,
    pub end_date: Option<NaiveDate>,
    pub program_fallback_id: Option<DbId>,
    pub selected_property_ids: Vec<DbId>,
    pub metadata: serde_json::Value,
}
