//! Batched prerequisite lookups for the import pipeline.
//!
//! Table and column names come from static rule tables and are always
//! double-quoted. Every value is bound as an array parameter, so one lookup
//! is a single statement regardless of how many rows referenced it.

use async_trait::async_trait;
use leasehold_core::error::CoreError;
use leasehold_core::import::{LookupRow, LookupSource};
use leasehold_core::types::DbId;
use sqlx::PgPool;

use crate::models::lookup::LookupRecord;

/// [`LookupSource`] backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgLookupSource {
    pool: PgPool,
}

impl PgLookupSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Quote an identifier for interpolation into SQL.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Foreign-key columns (`*_id`, but not `external*`) compare as exact
/// bigints instead of case-folded text.
fn is_foreign_key(column: &str) -> bool {
    column.ends_with("_id") && !column.starts_with("external")
}

/// Lowercased, de-duplicated values in first-seen order.
fn distinct_lowercase(values: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

fn lookup_failed(table: &str, field: &str, error: sqlx::Error) -> CoreError {
    tracing::error!(table, field, error = %error, "Prerequisite lookup failed");
    CoreError::Internal(error.to_string())
}

#[async_trait]
impl LookupSource for PgLookupSource {
    async fn select_id_and_field_from_value_list(
        &self,
        table: &str,
        field: &str,
        values: &[String],
    ) -> Result<Vec<LookupRow>, CoreError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let column = quote_ident(field);
        let from = quote_ident(table);

        let records = if is_foreign_key(field) {
            let ids: Vec<DbId> = values.iter().filter_map(|v| v.trim().parse().ok()).collect();
            let query = format!(
                "SELECT id, {column}::text AS value, NULL::bigint AS related_id \
                 FROM {from} WHERE {column} = ANY($1::bigint[])"
            );
            sqlx::query_as::<_, LookupRecord>(&query)
                .bind(ids)
                .fetch_all(&self.pool)
                .await
        } else {
            let query = format!(
                "SELECT id, {column}::text AS value, NULL::bigint AS related_id \
                 FROM {from} WHERE lower({column}) = ANY($1::text[])"
            );
            sqlx::query_as::<_, LookupRecord>(&query)
                .bind(distinct_lowercase(values))
                .fetch_all(&self.pool)
                .await
        }
        .map_err(|e| lookup_failed(table, field, e))?;

        Ok(records.into_iter().map(LookupRow::from).collect())
    }

    async fn select_id_from_value_groups(
        &self,
        table: &str,
        related_field: &str,
        field: &str,
        groups: &[(DbId, String)],
    ) -> Result<Vec<LookupRow>, CoreError> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        let column = quote_ident(field);
        let related = quote_ident(related_field);
        let from = quote_ident(table);
        let value_match = if is_foreign_key(field) {
            format!("t.{column}::text = g.value")
        } else {
            format!("lower(t.{column}) = lower(g.value)")
        };

        let (related_ids, names): (Vec<DbId>, Vec<String>) = groups.iter().cloned().unzip();
        let query = format!(
            "SELECT DISTINCT t.id, t.{column}::text AS value, t.{related} AS related_id \
             FROM {from} t \
             JOIN UNNEST($1::bigint[], $2::text[]) AS g(related_id, value) \
                ON t.{related} = g.related_id AND {value_match}"
        );
        let records = sqlx::query_as::<_, LookupRecord>(&query)
            .bind(related_ids)
            .bind(names)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| lookup_failed(table, field, e))?;

        Ok(records.into_iter().map(LookupRow::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("properties"), "\"properties\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn foreign_key_columns() {
        assert!(is_foreign_key("property_id"));
        assert!(!is_foreign_key("external_id"));
        assert!(!is_foreign_key("name"));
    }

    #[test]
    fn values_are_folded_once() {
        let values = vec!["Parkmerced".to_string(), " PARKMERCED ".to_string(), "Serenity".to_string()];
        assert_eq!(distinct_lowercase(&values), vec!["parkmerced", "serenity"]);
    }
}
