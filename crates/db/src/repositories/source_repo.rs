//! Repository for the `sources` table.

use sqlx::PgPool;

use crate::models::source::{CreateSource, Source};

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct SourceRepo;

impl SourceRepo {
    pub async fn create(pool: &PgPool, input: &CreateSource) -> Result<Source, sqlx::Error> {
        let query = format!("INSERT INTO sources (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Source>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }
}
