//! Repository for the `fees` and `associated_fees` tables.

use leasehold_core::types::DbId;
use sqlx::PgPool;

use crate::models::fee::{AssociatedFee, CreateFee, Fee, FeeAssociations, FeeSummary};

/// Column list for the `fees` table.
const COLUMNS: &str = "id, property_id, name, display_name, description, fee_type, \
    renewal_letter_display, quote_section_name, max_quantity_in_quote, service_period, \
    variable_adjustment, estimated, relative_price, absolute_price, relative_default_price, \
    absolute_default_price, price_floor_ceiling, deposit_interest, quote_payment_schedule, \
    lease_state, marketing_question_name, external_accounts, created_at, updated_at";

/// Provides data access for fees and the links between them.
pub struct FeeRepo;

impl FeeRepo {
    /// Upsert fees on `(property_id, name)`, one transaction per chunk of
    /// `chunk_size` rows. Returns the stored rows in input order.
    pub async fn bulk_upsert(
        pool: &PgPool,
        fees: &[CreateFee],
        chunk_size: usize,
    ) -> Result<Vec<Fee>, sqlx::Error> {
        let query = format!(
            "INSERT INTO fees (property_id, name, display_name, description, fee_type, \
                renewal_letter_display, quote_section_name, max_quantity_in_quote, \
                service_period, variable_adjustment, estimated, relative_price, absolute_price, \
                relative_default_price, absolute_default_price, price_floor_ceiling, \
                deposit_interest, quote_payment_schedule, lease_state, marketing_question_name, \
                external_accounts) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                $17, $18, $19, $20, $21) \
             ON CONFLICT (property_id, name) \
             DO UPDATE SET display_name = EXCLUDED.display_name, \
                           description = EXCLUDED.description, \
                           fee_type = EXCLUDED.fee_type, \
                           renewal_letter_display = EXCLUDED.renewal_letter_display, \
                           quote_section_name = EXCLUDED.quote_section_name, \
                           max_quantity_in_quote = EXCLUDED.max_quantity_in_quote, \
                           service_period = EXCLUDED.service_period, \
                           variable_adjustment = EXCLUDED.variable_adjustment, \
                           estimated = EXCLUDED.estimated, \
                           relative_price = EXCLUDED.relative_price, \
                           absolute_price = EXCLUDED.absolute_price, \
                           relative_default_price = EXCLUDED.relative_default_price, \
                           absolute_default_price = EXCLUDED.absolute_default_price, \
                           price_floor_ceiling = EXCLUDED.price_floor_ceiling, \
                           deposit_interest = EXCLUDED.deposit_interest, \
                           quote_payment_schedule = EXCLUDED.quote_payment_schedule, \
                           lease_state = EXCLUDED.lease_state, \
                           marketing_question_name = EXCLUDED.marketing_question_name, \
                           external_accounts = EXCLUDED.external_accounts, \
                           updated_at = now() \
             RETURNING {COLUMNS}"
        );

        let mut results = Vec::with_capacity(fees.len());
        for chunk in fees.chunks(chunk_size.max(1)) {
            let mut tx = pool.begin().await?;
            for fee in chunk {
                let row = sqlx::query_as::<_, Fee>(&query)
                    .bind(fee.property_id)
                    .bind(&fee.name)
                    .bind(&fee.display_name)
                    .bind(&fee.description)
                    .bind(&fee.fee_type)
                    .bind(fee.renewal_letter_display)
                    .bind(&fee.quote_section_name)
                    .bind(fee.max_quantity_in_quote)
                    .bind(&fee.service_period)
                    .bind(fee.variable_adjustment)
                    .bind(fee.estimated)
                    .bind(fee.relative_price)
                    .bind(fee.absolute_price)
                    .bind(fee.relative_default_price)
                    .bind(fee.absolute_default_price)
                    .bind(&fee.price_floor_ceiling)
                    .bind(fee.deposit_interest)
                    .bind(fee.quote_payment_schedule)
                    .bind(&fee.lease_state)
                    .bind(&fee.marketing_question_name)
                    .bind(&fee.external_accounts)
                    .fetch_one(&mut *tx)
                    .await?;
                results.push(row);
            }
            tx.commit().await?;
        }
        Ok(results)
    }

    /// Every fee of the given properties, for associated-fee resolution.
    pub async fn list_summaries_by_properties(
        pool: &PgPool,
        property_ids: &[DbId],
    ) -> Result<Vec<FeeSummary>, sqlx::Error> {
        sqlx::query_as::<_, FeeSummary>(
            "SELECT id, property_id, name, display_name, fee_type, relative_price, \
                relative_default_price \
             FROM fees WHERE property_id = ANY($1::bigint[]) ORDER BY property_id, id",
        )
        .bind(property_ids)
        .fetch_all(pool)
        .await
    }

    /// Every fee of the property with the given name, ignoring case.
    pub async fn list_summaries_by_property_name(
        pool: &PgPool,
        property_name: &str,
    ) -> Result<Vec<FeeSummary>, sqlx::Error> {
        sqlx::query_as::<_, FeeSummary>(
            "SELECT f.id, f.property_id, f.name, f.display_name, f.fee_type, f.relative_price, \
                f.relative_default_price \
             FROM fees f JOIN properties p ON p.id = f.property_id \
             WHERE lower(p.name) = lower($1) ORDER BY f.id",
        )
        .bind(property_name.trim())
        .fetch_all(pool)
        .await
    }

    /// Existing `(primary, associated)` links among the given properties' fees.
    pub async fn association_links(
        pool: &PgPool,
        property_ids: &[DbId],
    ) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId)>(
            "SELECT af.primary_fee_id, af.associated_fee_id \
             FROM associated_fees af \
             JOIN fees f ON f.id = af.primary_fee_id \
             WHERE f.property_id = ANY($1::bigint[])",
        )
        .bind(property_ids)
        .fetch_all(pool)
        .await
    }

    /// Replace the associations of every listed primary fee in one
    /// transaction.
    pub async fn replace_associations(
        pool: &PgPool,
        associations: &[FeeAssociations],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for links in associations {
            sqlx::query("DELETE FROM associated_fees WHERE primary_fee_id = $1")
                .bind(links.primary_fee_id)
                .execute(&mut *tx)
                .await?;

            let (ids, flags): (Vec<DbId>, Vec<bool>) = links
                .related_fee_ids
                .iter()
                .map(|id| (*id, false))
                .chain(links.additional_fee_ids.iter().map(|id| (*id, true)))
                .unzip();
            if ids.is_empty() {
                continue;
            }
            let result = sqlx::query(
                "INSERT INTO associated_fees (primary_fee_id, associated_fee_id, is_additional) \
                 SELECT $1, associated_fee_id, is_additional \
                 FROM UNNEST($2::bigint[], $3::bool[]) AS t(associated_fee_id, is_additional) \
                 ON CONFLICT (primary_fee_id, associated_fee_id) \
                 DO UPDATE SET is_additional = EXCLUDED.is_additional",
            )
            .bind(links.primary_fee_id)
            .bind(&ids)
            .bind(&flags)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Fees associated with a primary fee.
    pub async fn list_associations(
        pool: &PgPool,
        primary_fee_id: DbId,
    ) -> Result<Vec<AssociatedFee>, sqlx::Error> {
        sqlx::query_as::<_, AssociatedFee>(
            "SELECT primary_fee_id, associated_fee_id, is_additional, created_at \
             FROM associated_fees WHERE primary_fee_id = $1 ORDER BY associated_fee_id",
        )
        .bind(primary_fee_id)
        .fetch_all(pool)
        .await
    }
}
