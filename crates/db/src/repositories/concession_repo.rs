//! Repository for the `concessions` and `concession_fees` tables.

use leasehold_core::types::DbId;
use sqlx::PgPool;

use crate::models::concession::{Concession, CreateConcession};

/// Column list for the `concessions` table.
const COLUMNS: &str = "id, property_id, name, display_name, relative_adjustment, \
    absolute_adjustment, relative_default_adjustment, absolute_default_adjustment, \
    adjustment_floor_ceiling, variable_adjustment, optional, exclude_from_rent, \
    hide_in_self_service, recurring, recurring_count, non_recurring_applied_at, lease_state, \
    matching_criteria, start_date, end_date, account, sub_account, taxable, \
    external_charge_code, baked_into_applied_fee, created_at, updated_at";

/// Provides data access for concessions.
pub struct ConcessionRepo;

impl ConcessionRepo {
    /// Upsert a concession on `(property_id, name)` and replace the fees it
    /// applies to, in one transaction.
    pub async fn upsert_with_fees(
        pool: &PgPool,
        input: &CreateConcession,
        fee_ids: &[DbId],
    ) -> Result<Concession, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO concessions (property_id, name, display_name, relative_adjustment, \
                absolute_adjustment, relative_default_adjustment, absolute_default_adjustment, \
                adjustment_floor_ceiling, variable_adjustment, optional, exclude_from_rent, \
                hide_in_self_service, recurring, recurring_count, non_recurring_applied_at, \
                lease_state, matching_criteria, start_date, end_date, account, sub_account, \
                taxable, external_charge_code, baked_into_applied_fee) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                $17, $18, $19, $20, $21, $22, $23, $24) \
             ON CONFLICT (property_id, name) \
             DO UPDATE SET display_name = EXCLUDED.display_name, \
                           relative_adjustment = EXCLUDED.relative_adjustment, \
                           absolute_adjustment = EXCLUDED.absolute_adjustment, \
                           relative_default_adjustment = EXCLUDED.relative_default_adjustment, \
                           absolute_default_adjustment = EXCLUDED.absolute_default_adjustment, \
                           adjustment_floor_ceiling = EXCLUDED.adjustment_floor_ceiling, \
                           variable_adjustment = EXCLUDED.variable_adjustment, \
                           optional = EXCLUDED.optional, \
                           exclude_from_rent = EXCLUDED.exclude_from_rent, \
                           hide_in_self_service = EXCLUDED.hide_in_self_service, \
                           recurring = EXCLUDED.recurring, \
                           recurring_count = EXCLUDED.recurring_count, \
                           non_recurring_applied_at = EXCLUDED.non_recurring_applied_at, \
                           lease_state = EXCLUDED.lease_state, \
                           matching_criteria = EXCLUDED.matching_criteria, \
                           start_date = EXCLUDED.start_date, \
                           end_date = EXCLUDED.end_date, \
                           account = EXCLUDED.account, \
                           sub_account = EXCLUDED.sub_account, \
                           taxable = EXCLUDED.taxable, \
                           external_charge_code = EXCLUDED.external_charge_code, \
                           baked_into_applied_fee = EXCLUDED.baked_into_applied_fee, \
                           updated_at = now() \
             RETURNING {COLUMNS}"
        );
        let concession = sqlx::query_as::<_, Concession>(&query)
            .bind(input.property_id)
            .bind(&input.name)
            .bind(&input.display_name)
            .bind(input.relative_adjustment)
            .bind(input.absolute_adjustment)
            .bind(input.relative_default_adjustment)
            .bind(input.absolute_default_adjustment)
            .bind(&input.adjustment_floor_ceiling)
            .bind(input.variable_adjustment)
            .bind(input.optional)
            .bind(input.exclude_from_rent)
            .bind(input.hide_in_self_service)
            .bind(input.recurring)
            .bind(input.recurring_count)
            .bind(&input.non_recurring_applied_at)
            .bind(&input.lease_state)
            .bind(&input.matching_criteria)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.account)
            .bind(input.sub_account)
            .bind(input.taxable)
            .bind(&input.external_charge_code)
            .bind(input.baked_into_applied_fee)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM concession_fees WHERE concession_id = $1")
            .bind(concession.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO concession_fees (concession_id, fee_id) \
             SELECT $1, fee_id FROM UNNEST($2::bigint[]) AS t(fee_id) \
             ON CONFLICT DO NOTHING",
        )
        .bind(concession.id)
        .bind(fee_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(concession)
    }

    /// Ids of the fees a concession applies to.
    pub async fn list_fee_ids(pool: &PgPool, concession_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT fee_id FROM concession_fees WHERE concession_id = $1 ORDER BY fee_id",
        )
        .bind(concession_id)
        .fetch_all(pool)
        .await
    }
}
