//! Fee entity model, DTOs and associated-fee links.

use leasehold_core::inventory::fee::PropertyFee;
use leasehold_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A fee row from the `fees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fee {
    pub id: DbId,
    pub property_id: DbId,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub fee_type: String,
    pub renewal_letter_display: bool,
    pub quote_section_name: Option<String>,
    pub max_quantity_in_quote: f64,
    pub service_period: Option<String>,
    pub variable_adjustment: bool,
    pub estimated: bool,
    pub relative_price: Option<f64>,
    pub absolute_price: Option<f64>,
    pub relative_default_price: Option<f64>,
    pub absolute_default_price: Option<f64>,
    pub price_floor_ceiling: Option<String>,
    pub deposit_interest: bool,
    pub quote_payment_schedule: bool,
    pub lease_state: Option<String>,
    pub marketing_question_name: Option<String>,
    /// External accounting codes keyed by sheet column.
    pub external_accounts: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a fee on `(property_id, name)`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFee {
    pub property_id: DbId,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub fee_type: String,
    pub renewal_letter_display: bool,
    pub quote_section_name: Option<String>,
    pub max_quantity_in_quote: f64,
    pub service_period: Option<String>,
    pub variable_adjustment: bool,
    pub estimated: bool,
    pub relative_price: Option<f64>,
    pub absolute_price: Option<f64>,
    pub relative_default_price: Option<f64>,
    pub absolute_default_price: Option<f64>,
    pub price_floor_ceiling: Option<String>,
    pub deposit_interest: bool,
    pub quote_payment_schedule: bool,
    pub lease_state: Option<String>,
    pub marketing_question_name: Option<String>,
    pub external_accounts: serde_json::Value,
}

/// The columns needed to resolve and check associated fee names.
#[derive(Debug, Clone, FromRow)]
pub struct FeeSummary {
    pub id: DbId,
    pub property_id: DbId,
    pub name: String,
    pub display_name: String,
    pub fee_type: String,
    pub relative_price: Option<f64>,
    pub relative_default_price: Option<f64>,
}

impl From<FeeSummary> for PropertyFee {
    fn from(fee: FeeSummary) -> Self {
        PropertyFee {
            id: fee.id,
            name: fee.name,
            display_name: fee.display_name,
            fee_type: fee.fee_type,
            relative_price: fee.relative_price,
            relative_default_price: fee.relative_default_price,
        }
    }
}

/// A row from the `associated_fees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssociatedFee {
    pub primary_fee_id: DbId,
    pub associated_fee_id: DbId,
    pub is_additional: bool,
    pub created_at: Timestamp,
}

/// The full set of fees a primary fee should be associated with.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeAssociations {
    pub primary_fee_id: DbId,
    pub related_fee_ids: Vec<DbId>,
    pub additional_fee_ids: Vec<DbId>,
}
