// Integration tests for treatment record merge
//
// These tests verify that creating a treatment and updating its customer's
// visit statistics happen as one unit, that partial updates touch only the
// supplied fields, and that the store state survives a restart.

mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::{new_customer, seed_salon};
use noteastyle::error::Error;
use noteastyle::model::{NewTreatment, Page, ProductUsed, Satisfaction, TreatmentPatch};
use noteastyle::records::TreatmentFilter;
use noteastyle::{Directory, Store, Treatments};
use tempfile::TempDir;
use uuid::Uuid;

fn color_treatment(customer_id: Uuid) -> NewTreatment {
    NewTreatment {
        customer_id,
        designer_id: None,
        service_type: "color".to_string(),
        service_detail: Some("뿌리 염색".to_string()),
        products_used: vec![ProductUsed {
            brand: "로레알".to_string(),
            code: Some("7.1".to_string()),
            area: Some("뿌리".to_string()),
        }],
        area: Some("뿌리".to_string()),
        duration_minutes: Some(90),
        price: Some(80_000),
        satisfaction: Some(Satisfaction::High),
        customer_notes: None,
        next_visit_recommendation: None,
        performed_at: None,
        ai_summary: None,
    }
}

#[tokio::test]
async fn test_creating_treatment_records_a_visit() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());
    let directory = Directory::new(store.clone());

    assert_eq!(salon.customer.visit_count, 0);
    assert_eq!(salon.customer.last_visit, None);

    let first = treatments
        .create_treatment(salon.shop.id, color_treatment(salon.customer.id), None)
        .await?;
    let customer = directory.get_customer(salon.shop.id, salon.customer.id).await?;
    assert_eq!(customer.visit_count, 1);
    assert_eq!(customer.last_visit, Some(first.created_at));

    let second = treatments
        .create_treatment(salon.shop.id, color_treatment(salon.customer.id), None)
        .await?;
    let customer = directory.get_customer(salon.shop.id, salon.customer.id).await?;
    assert_eq!(customer.visit_count, 2);
    assert_eq!(customer.last_visit, Some(second.created_at));
    Ok(())
}

#[tokio::test]
async fn test_backdated_treatment_keeps_latest_visit() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());

    let today = treatments
        .create_treatment(salon.shop.id, color_treatment(salon.customer.id), None)
        .await?;

    let mut last_month = color_treatment(salon.customer.id);
    last_month.performed_at = Some(Utc::now() - Duration::days(30));
    let backdated = treatments
        .create_treatment(salon.shop.id, last_month, None)
        .await?;

    let customer = Directory::new(store.clone())
        .get_customer(salon.shop.id, salon.customer.id)
        .await?;
    assert_eq!(customer.visit_count, 2);
    assert_eq!(customer.last_visit, Some(today.created_at));

    let listed = treatments
        .list_treatments(salon.shop.id, TreatmentFilter::default(), Page::default())
        .await?;
    let ids: Vec<Uuid> = listed.iter().map(|d| d.treatment.id).collect();
    assert_eq!(ids, vec![today.id, backdated.id], "Newest visit first");
    Ok(())
}

#[tokio::test]
async fn test_unknown_customer_leaves_no_treatment_behind() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());

    let err = treatments
        .create_treatment(salon.shop.id, color_treatment(Uuid::new_v4()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    assert_eq!(store.read(|t| t.treatment_count()).await, 0, "No orphan treatment");
    Ok(())
}

#[tokio::test]
async fn test_customer_of_another_shop_is_rejected() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let other = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());

    let err = treatments
        .create_treatment(salon.shop.id, color_treatment(other.customer.id), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let customer = Directory::new(store.clone())
        .get_customer(other.shop.id, other.customer.id)
        .await?;
    assert_eq!(customer.visit_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_unknown_shop_is_not_found() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());

    let err = treatments
        .create_treatment(Uuid::new_v4(), color_treatment(salon.customer.id), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "shop", .. }));
    Ok(())
}

#[tokio::test]
async fn test_invalid_submission_changes_nothing() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());

    let mut negative = color_treatment(salon.customer.id);
    negative.price = Some(-10_000);
    assert!(matches!(
        treatments.create_treatment(salon.shop.id, negative, None).await,
        Err(Error::Validation(_))
    ));

    let mut stranger = color_treatment(salon.customer.id);
    stranger.designer_id = Some(Uuid::new_v4());
    assert!(matches!(
        treatments.create_treatment(salon.shop.id, stranger, None).await,
        Err(Error::Validation(_))
    ));

    let customer = Directory::new(store.clone())
        .get_customer(salon.shop.id, salon.customer.id)
        .await?;
    assert_eq!(customer.visit_count, 0);
    assert_eq!(store.read(|t| t.treatment_count()).await, 0);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_creations_never_lose_a_visit() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());

    let mut handles = Vec::new();
    for _ in 0..20 {
        let treatments = treatments.clone();
        let shop_id = salon.shop.id;
        let customer_id = salon.customer.id;
        handles.push(tokio::spawn(async move {
            treatments
                .create_treatment(shop_id, color_treatment(customer_id), None)
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let customer = Directory::new(store.clone())
        .get_customer(salon.shop.id, salon.customer.id)
        .await?;
    assert_eq!(customer.visit_count, 20, "Every creation should be counted");
    assert_eq!(store.read(|t| t.treatment_count()).await, 20);
    Ok(())
}

#[tokio::test]
async fn test_repeated_idempotency_key_records_one_visit() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());

    let first = treatments
        .create_treatment(
            salon.shop.id,
            color_treatment(salon.customer.id),
            Some("memo-42"),
        )
        .await?;
    let retry = treatments
        .create_treatment(
            salon.shop.id,
            color_treatment(salon.customer.id),
            Some("memo-42"),
        )
        .await?;

    assert_eq!(first.id, retry.id);
    let customer = Directory::new(store.clone())
        .get_customer(salon.shop.id, salon.customer.id)
        .await?;
    assert_eq!(customer.visit_count, 1);
    assert_eq!(store.read(|t| t.treatment_count()).await, 1);
    Ok(())
}

#[tokio::test]
async fn test_partial_update_leaves_other_fields_alone() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());

    let original = treatments
        .create_treatment(salon.shop.id, color_treatment(salon.customer.id), None)
        .await?;

    let patch: TreatmentPatch = serde_json::from_str(
        r#"{"satisfaction": "medium", "customer_notes": "두피 민감", "service_detail": null}"#,
    )?;
    let updated = treatments
        .update_treatment(salon.shop.id, original.id, patch)
        .await?;

    assert_eq!(updated.satisfaction, Some(Satisfaction::Medium));
    assert_eq!(updated.customer_notes.as_deref(), Some("두피 민감"));
    assert_eq!(updated.service_detail, None);
    assert_eq!(updated.service_type, original.service_type);
    assert_eq!(updated.products_used, original.products_used);
    assert_eq!(updated.area, original.area);
    assert_eq!(updated.duration_minutes, original.duration_minutes);
    assert_eq!(updated.price, original.price);
    assert_eq!(updated.created_at, original.created_at);

    let customer = Directory::new(store.clone())
        .get_customer(salon.shop.id, salon.customer.id)
        .await?;
    assert_eq!(customer.visit_count, 1, "Updates are not visits");
    Ok(())
}

#[tokio::test]
async fn test_update_rejects_null_service_type() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());

    let original = treatments
        .create_treatment(salon.shop.id, color_treatment(salon.customer.id), None)
        .await?;

    let patch: TreatmentPatch =
        serde_json::from_str(r#"{"service_type": null, "price": 1}"#)?;
    let err = treatments
        .update_treatment(salon.shop.id, original.id, patch)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let stored = treatments.get_treatment(salon.shop.id, original.id).await?;
    assert_eq!(stored.treatment, original);
    Ok(())
}

#[tokio::test]
async fn test_treatments_filtered_by_customer_and_service() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let treatments = Treatments::new(store.clone());
    let second = Directory::new(store.clone())
        .create_customer(salon.shop.id, new_customer("이하은"))
        .await?;

    treatments
        .create_treatment(salon.shop.id, color_treatment(salon.customer.id), None)
        .await?;
    let mut cut = color_treatment(second.id);
    cut.service_type = "cut".to_string();
    cut.products_used.clear();
    let cut = treatments.create_treatment(salon.shop.id, cut, None).await?;

    let by_customer = treatments
        .list_treatments(
            salon.shop.id,
            TreatmentFilter {
                customer_id: Some(second.id),
                service_type: None,
            },
            Page::default(),
        )
        .await?;
    assert_eq!(by_customer.len(), 1);
    assert_eq!(by_customer[0].treatment.id, cut.id);

    let by_service = treatments
        .list_treatments(
            salon.shop.id,
            TreatmentFilter {
                customer_id: None,
                service_type: Some("color".to_string()),
            },
            Page::default(),
        )
        .await?;
    assert_eq!(by_service.len(), 1);
    assert_eq!(by_service[0].treatment.customer_id, salon.customer.id);
    Ok(())
}

#[tokio::test]
async fn test_customers_listed_by_most_recent_visit() -> Result<()> {
    let store = Store::in_memory();
    let salon = seed_salon(&store).await?;
    let directory = Directory::new(store.clone());
    let treatments = Treatments::new(store.clone());

    let regular = directory
        .create_customer(salon.shop.id, new_customer("이하은"))
        .await?;
    treatments
        .create_treatment(salon.shop.id, color_treatment(regular.id), None)
        .await?;

    let listed = directory
        .list_customers(salon.shop.id, None, Page::default())
        .await?;
    let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["이하은", "박서연"], "Never-visited customers last");

    let found = directory
        .list_customers(salon.shop.id, Some("서연"), Page::default())
        .await?;
    assert_eq!(found.len(), 1);
    assert_eq!(directory.count_customers(salon.shop.id).await?, 2);

    let err = directory
        .list_customers(salon.shop.id, None, Page { skip: 0, limit: 500 })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn test_snapshot_survives_restart() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("noteastyle.json");

    let (shop_id, customer_id) = {
        let store = Store::open(&path).await?;
        let salon = seed_salon(&store).await?;
        Treatments::new(store.clone())
            .create_treatment(salon.shop.id, color_treatment(salon.customer.id), Some("k1"))
            .await?;
        (salon.shop.id, salon.customer.id)
    };

    let reopened = Store::open(&path).await?;
    let customer = Directory::new(reopened.clone())
        .get_customer(shop_id, customer_id)
        .await?;
    assert_eq!(customer.visit_count, 1);

    let replay = Treatments::new(reopened.clone())
        .create_treatment(shop_id, color_treatment(customer_id), Some("k1"))
        .await?;
    assert_eq!(reopened.read(|t| t.treatment_count()).await, 1);
    assert_eq!(replay.customer_id, customer_id);
    Ok(())
}
