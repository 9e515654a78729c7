//! Integration tests for the Postgres-backed prerequisite lookups.
//!
//! Runs against the database named by `DATABASE_URL`.

use leasehold_core::import::{LookupRow, LookupSource};
use leasehold_db::models::property::CreateProperty;
use leasehold_db::repositories::{PgLookupSource, PropertyRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn property(pool: &PgPool, name: &str) -> i64 {
    PropertyRepo::create(
        pool,
        &CreateProperty {
            name: name.to_string(),
            timezone: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn building(pool: &PgPool, property_id: i64, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO buildings (property_id, name) VALUES ($1, $2) RETURNING id")
        .bind(property_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Value lists
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_value_list_matches_ignoring_case(pool: PgPool) {
    let parkmerced = property(&pool, "Parkmerced").await;
    property(&pool, "Serenity").await;

    let source = PgLookupSource::new(pool.clone());
    let rows = source
        .select_id_and_field_from_value_list(
            "properties",
            "name",
            &strings(&["PARKMERCED", "parkmerced", "Missing"]),
        )
        .await
        .unwrap();

    assert_eq!(rows, vec![LookupRow::new(parkmerced, "Parkmerced")]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_key_columns_compare_as_ids(pool: PgPool) {
    let parkmerced = property(&pool, "Parkmerced").await;
    let lobby = building(&pool, parkmerced, "Lobby").await;

    let source = PgLookupSource::new(pool.clone());
    let rows = source
        .select_id_and_field_from_value_list(
            "buildings",
            "property_id",
            &strings(&[&parkmerced.to_string(), "not a number"]),
        )
        .await
        .unwrap();

    assert_eq!(rows, vec![LookupRow::new(lobby, parkmerced.to_string())]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_table_is_an_error(pool: PgPool) {
    let source = PgLookupSource::new(pool.clone());
    let result = source
        .select_id_and_field_from_value_list("no_such_table", "name", &strings(&["x"]))
        .await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Value groups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_groups_match_name_and_related_id_jointly(pool: PgPool) {
    let parkmerced = property(&pool, "Parkmerced").await;
    let serenity = property(&pool, "Serenity").await;
    let parkmerced_a = building(&pool, parkmerced, "Building A").await;
    building(&pool, serenity, "Building A").await;
    building(&pool, serenity, "Building B").await;

    let source = PgLookupSource::new(pool.clone());
    let rows = source
        .select_id_from_value_groups(
            "buildings",
            "property_id",
            "name",
            &[
                (parkmerced, "building a".to_string()),
                (parkmerced, "Building B".to_string()),
            ],
        )
        .await
        .unwrap();

    assert_eq!(rows, vec![LookupRow::related(parkmerced_a, "Building A", parkmerced)]);
}
