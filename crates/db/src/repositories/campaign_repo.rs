//! Repository for the `campaigns` table.

use sqlx::PgPool;

use crate::models::campaign::{Campaign, CreateCampaign};

/// Column list for the `campaigns` table.
const COLUMNS: &str = "id, name, display_name, description, created_at, updated_at";

/// Provides data access for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a campaign or update the one with the same name.
    pub async fn upsert(pool: &PgPool, input: &CreateCampaign) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (name, display_name, description) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (name) \
             DO UPDATE SET display_name = EXCLUDED.display_name, \
                           description = EXCLUDED.description, \
                           updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(&input.name)
            .bind(&input.display_name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE name = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all campaigns ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns ORDER BY name");
        sqlx::query_as::<_, Campaign>(&query).fetch_all(pool).await
    }
}
