//! Repository for the `properties` table.

use leasehold_core::types::DbId;
use sqlx::PgPool;

use crate::models::property::{CreateProperty, Property};

/// Column list for the `properties` table.
const COLUMNS: &str = "id, name, timezone, created_at, updated_at";

/// Provides data access for properties.
pub struct PropertyRepo;

impl PropertyRepo {
    /// Insert a new property, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProperty) -> Result<Property, sqlx::Error> {
        let query = format!(
            "INSERT INTO properties (name, timezone) \
             VALUES ($1, COALESCE($2, 'America/Los_Angeles')) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(&input.name)
            .bind(&input.timezone)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties WHERE id = $1");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Ids of the properties whose names match, ignoring case.
    pub async fn ids_by_names(pool: &PgPool, names: &[String]) -> Result<Vec<DbId>, sqlx::Error> {
        let names: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM properties WHERE lower(name) = ANY($1::text[]) ORDER BY id",
        )
        .bind(names)
        .fetch_all(pool)
        .await
    }
}
