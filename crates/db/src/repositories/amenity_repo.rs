//! Repository for the `amenities` table.

use leasehold_core::types::DbId;
use sqlx::PgPool;

use crate::models::amenity::{Amenity, CreateAmenity};

/// Column list for the `amenities` table.
const COLUMNS: &str = "id, property_id, name, category, sub_category, display_name, description, \
    high_value, relative_price, absolute_price, target_unit, hidden, external_id, end_date, \
    created_at, updated_at";

/// Provides data access for amenities.
pub struct AmenityRepo;

impl AmenityRepo {
    /// Insert an amenity or update the one with the same property, category
    /// and name.
    pub async fn upsert(pool: &PgPool, input: &CreateAmenity) -> Result<Amenity, sqlx::Error> {
        let query = format!(
            "INSERT INTO amenities (property_id, name, category, sub_category, display_name, \
                description, high_value, relative_price, absolute_price, target_unit, hidden, \
                external_id, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (property_id, category, name) \
             DO UPDATE SET sub_category = EXCLUDED.sub_category, \
                           display_name = EXCLUDED.display_name, \
                           description = EXCLUDED.description, \
                           high_value = EXCLUDED.high_value, \
                           relative_price = EXCLUDED.relative_price, \
                           absolute_price = EXCLUDED.absolute_price, \
                           target_unit = EXCLUDED.target_unit, \
                           hidden = EXCLUDED.hidden, \
                           external_id = EXCLUDED.external_id, \
                           end_date = EXCLUDED.end_date, \
                           updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Amenity>(&query)
            .bind(input.property_id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.sub_category)
            .bind(&input.display_name)
            .bind(&input.description)
            .bind(input.high_value)
            .bind(input.relative_price)
            .bind(input.absolute_price)
            .bind(input.target_unit)
            .bind(input.hidden)
            .bind(&input.external_id)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// List a property's amenities ordered by category and name.
    pub async fn list_by_property(
        pool: &PgPool,
        property_id: DbId,
    ) -> Result<Vec<Amenity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM amenities WHERE property_id = $1 ORDER BY category, name"
        );
        sqlx::query_as::<_, Amenity>(&query)
            .bind(property_id)
            .fetch_all(pool)
            .await
    }
}
