//! Campaigns sheet importer.

use async_trait::async_trait;
use leasehold_core::import::coercion::text_to_persist;
use leasehold_core::import::{validate, EntityError, ImportHandler};
use leasehold_core::inventory::{campaign, text};
use leasehold_core::spreadsheet::CAMPAIGNS;
use leasehold_core::types::RowData;
use leasehold_db::error::to_entity_error;
use leasehold_db::models::campaign::{Campaign, CreateCampaign};
use leasehold_db::repositories::{CampaignRepo, PgLookupSource};
use leasehold_db::DbPool;

use super::sheet_rows;
use crate::error::AppResult;
use crate::report::ImportOutcome;

struct CampaignHandler<'a> {
    pool: &'a DbPool,
    saved: Vec<Campaign>,
}

#[async_trait]
impl ImportHandler for CampaignHandler<'_> {
    async fn on_valid_entity(&mut self, data: &RowData, _index: usize) -> Result<(), EntityError> {
        let input = CreateCampaign {
            name: text(data, "name"),
            display_name: text(data, "displayName"),
            description: text_to_persist(data.get("description")),
        };
        let campaign = CampaignRepo::upsert(self.pool, &input)
            .await
            .map_err(to_entity_error)?;
        self.saved.push(campaign);
        Ok(())
    }
}

/// Insert new campaigns and update existing ones by name.
pub async fn import_campaigns(pool: &DbPool, rows: Vec<RowData>) -> AppResult<ImportOutcome> {
    let rows = sheet_rows(rows, &CAMPAIGNS);
    let source = PgLookupSource::new(pool.clone());
    let mut handler = CampaignHandler {
        pool,
        saved: Vec::new(),
    };

    let invalid_fields = validate(rows, &campaign::RULES, &source, &mut handler, Some(&CAMPAIGNS)).await?;
    Ok(ImportOutcome::new(invalid_fields, &handler.saved)?)
}
