//! Concession entity model and DTOs.

use chrono::NaiveDate;
use leasehold_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A concession row from the `concessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Concession {
    pub id: DbId,
    pub property_id: DbId,
    pub name: String,
    pub display_name: String,
    pub relative_adjustment: Option<f64>,
    pub absolute_adjustment: Option<f64>,
    pub relative_default_adjustment: Option<f64>,
    pub absolute_default_adjustment: Option<f64>,
    pub adjustment_floor_ceiling: Option<String>,
    pub variable_adjustment: bool,
    pub optional: bool,
    pub exclude_from_rent: bool,
    pub hide_in_self_service: bool,
    pub recurring: bool,
    pub recurring_count: Option<i32>,
    pub non_recurring_applied_at: Option<String>,
    pub lease_state: Option<String>,
    pub matching_criteria: Option<serde_json::Value>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub account: Option<i32>,
    pub sub_account: Option<i32>,
    pub taxable: bool,
    pub external_charge_code: Option<String>,
    pub baked_into_applied_fee: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a concession on `(property_id, name)`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConcession {
    pub property_id: DbId,
    pub name: String,
    pub display_name: String,
    pub relative_adjustment: Option<f64>,
    pub absolute_adjustment: Option<f64>,
    pub relative_default_adjustment: Option<f64>,
    pub absolute_default_adjustment: Option<f64>,
    pub adjustment_floor_ceiling: Option<String>,
    pub variable_adjustment: bool,
    pub optional: bool,
    pub exclude_from_rent: bool,
    pub hide_in_self_service: bool,
    pub recurring: bool,
    pub recurring_count: Option<i32>,
    pub non_recurring_applied_at: Option<String>,
    pub lease_state: Option<String>,
    pub matching_criteria: Option<serde_json::Value>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub account: Option<i32>,
    pub sub_account: Option<i32>,
    pub taxable: bool,
    pub external_charge_code: Option<String>,
    pub baked_into_applied_fee: bool,
}
