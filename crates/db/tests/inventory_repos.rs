//! Integration tests for the inventory upsert repositories.
//!
//! Runs against the database named by `DATABASE_URL`.

use leasehold_db::models::campaign::CreateCampaign;
use leasehold_db::models::concession::CreateConcession;
use leasehold_db::models::fee::{CreateFee, FeeAssociations};
use leasehold_db::models::property::CreateProperty;
use leasehold_db::repositories::{CampaignRepo, ConcessionRepo, FeeRepo, PropertyRepo};
use serde_json::json;
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

fn new_fee(property_id: i64, name: &str) -> CreateFee {
    CreateFee {
        property_id,
        name: name.to_string(),
        display_name: name.to_string(),
        description: None,
        fee_type: "service".to_string(),
        renewal_letter_display: false,
        quote_section_name: None,
        max_quantity_in_quote: 1.0,
        service_period: None,
        variable_adjustment: false,
        estimated: false,
        relative_price: None,
        absolute_price: Some(25.0),
        relative_default_price: None,
        absolute_default_price: None,
        price_floor_ceiling: None,
        deposit_interest: false,
        quote_payment_schedule: false,
        lease_state: None,
        marketing_question_name: None,
        external_accounts: json!({}),
    }
}

fn new_concession(property_id: i64, name: &str) -> CreateConcession {
    CreateConcession {
        property_id,
        name: name.to_string(),
        display_name: name.to_string(),
        relative_adjustment: Some(-10.0),
        absolute_adjustment: None,
        relative_default_adjustment: None,
        absolute_default_adjustment: None,
        adjustment_floor_ceiling: None,
        variable_adjustment: false,
        optional: false,
        exclude_from_rent: false,
        hide_in_self_service: false,
        recurring: false,
        recurring_count: None,
        non_recurring_applied_at: None,
        lease_state: None,
        matching_criteria: None,
        start_date: None,
        end_date: None,
        account: None,
        sub_account: None,
        taxable: false,
        external_charge_code: None,
        baked_into_applied_fee: false,
    }
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_campaign_upsert_updates_by_name(pool: PgPool) {
    let input = CreateCampaign {
        name: "Campaign1".to_string(),
        display_name: "Campaign 1".to_string(),
        description: Some("first".to_string()),
    };
    let created = CampaignRepo::upsert(&pool, &input).await.unwrap();

    let changed = CreateCampaign {
        description: Some("second".to_string()),
        ..input
    };
    let updated = CampaignRepo::upsert(&pool, &changed).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.description.as_deref(), Some("second"));
    assert_eq!(CampaignRepo::list(&pool).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fee_bulk_upsert_spans_chunks(pool: PgPool) {
    let property_id = property(&pool, "Parkmerced").await;
    let fees: Vec<CreateFee> = (0..5).map(|i| new_fee(property_id, &format!("Fee {i}"))).collect();

    let stored = FeeRepo::bulk_upsert(&pool, &fees, 2).await.unwrap();
    assert_eq!(stored.len(), 5);
    assert_eq!(stored[4].name, "Fee 4");

    let mut changed = new_fee(property_id, "Fee 0");
    changed.absolute_price = Some(30.0);
    let again = FeeRepo::bulk_upsert(&pool, &[changed], 1000).await.unwrap();
    assert_eq!(again[0].id, stored[0].id);
    assert_eq!(again[0].absolute_price, Some(30.0));

    let summaries = FeeRepo::list_summaries_by_properties(&pool, &[property_id]).await.unwrap();
    assert_eq!(summaries.len(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_associations_are_replaced(pool: PgPool) {
    let property_id = property(&pool, "Parkmerced").await;
    let fees = FeeRepo::bulk_upsert(
        &pool,
        &[
            new_fee(property_id, "Parking"),
            new_fee(property_id, "Reserved"),
            new_fee(property_id, "Covered"),
        ],
        1000,
    )
    .await
    .unwrap();
    let (parking, reserved, covered) = (fees[0].id, fees[1].id, fees[2].id);

    FeeRepo::replace_associations(
        &pool,
        &[FeeAssociations {
            primary_fee_id: parking,
            related_fee_ids: vec![reserved],
            additional_fee_ids: vec![covered],
        }],
    )
    .await
    .unwrap();
    let links = FeeRepo::association_links(&pool, &[property_id]).await.unwrap();
    assert_eq!(links.len(), 2);

    FeeRepo::replace_associations(
        &pool,
        &[FeeAssociations {
            primary_fee_id: parking,
            related_fee_ids: vec![],
            additional_fee_ids: vec![reserved],
        }],
    )
    .await
    .unwrap();
    let associations = FeeRepo::list_associations(&pool, parking).await.unwrap();
    assert_eq!(associations.len(), 1);
    assert_eq!(associations[0].associated_fee_id, reserved);
    assert!(associations[0].is_additional);
}

// ---------------------------------------------------------------------------
// Concessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concession_fee_links_follow_upsert(pool: PgPool) {
    let property_id = property(&pool, "Parkmerced").await;
    let fees = FeeRepo::bulk_upsert(
        &pool,
        &[new_fee(property_id, "Rent"), new_fee(property_id, "Parking")],
        1000,
    )
    .await
    .unwrap();

    let concession = new_concession(property_id, "Spring special");
    let created = ConcessionRepo::upsert_with_fees(&pool, &concession, &[fees[0].id, fees[1].id])
        .await
        .unwrap();
    let updated = ConcessionRepo::upsert_with_fees(&pool, &concession, &[fees[1].id])
        .await
        .unwrap();

    assert_eq!(created.id, updated.id);
    assert_eq!(
        ConcessionRepo::list_fee_ids(&pool, updated.id).await.unwrap(),
        vec![fees[1].id]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_property_is_rejected(pool: PgPool) {
    property(&pool, "Parkmerced").await;
    let result = PropertyRepo::create(
        &pool,
        &CreateProperty {
            name: "Parkmerced".to_string(),
            timezone: None,
        },
    )
    .await;

    let error = leasehold_db::error::to_entity_error(result.unwrap_err());
    assert!(error.to_string().contains("duplicate key"));
}
