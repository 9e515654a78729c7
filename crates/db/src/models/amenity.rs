//! Amenity entity model and DTOs.

use chrono::NaiveDate;
use leasehold_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An amenity row from the `amenities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Amenity {
    pub id: DbId,
    pub property_id: DbId,
    pub name: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub display_name: String,
    pub description: Option<String>,
    pub high_value: bool,
    pub relative_price: Option<f64>,
    pub absolute_price: Option<f64>,
    pub target_unit: bool,
    pub hidden: bool,
    pub external_id: Option<String>,
    pub end_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting an amenity on `(property_id, category, name)`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAmenity {
    pub property_id: DbId,
    pub name: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub display_name: String,
    pub description: Option<String>,
    pub high_value: bool,
    pub relative_price: Option<f64>,
    pub absolute_price: Option<f64>,
    pub target_unit: bool,
    pub hidden: bool,
    pub external_id: Option<String>,
    pub end_date: Option<NaiveDate>,
}
