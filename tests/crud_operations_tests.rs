use axum::http::StatusCode;
use chrono::{NaiveDate, TimeZone, Utc};
use crudshape::clock::FixedClock;
use crudshape::entities::{building, work_task};
use crudshape::patch::PatchOperation;
use crudshape::{ApiError, FilterCriterion, FilterOperator, ListQuery};
use serde_json::json;
use uuid::Uuid;

mod common;
use common::{init_tracing, seed_building, service, setup_test_db, test_clock, test_time};

async fn stored_building(
    buildings: &crudshape::CrudService<building::Entity>,
    id: Uuid,
) -> building::Model {
    let mut found = buildings
        .get(&ListQuery::new().with_filters(vec![FilterCriterion::new(
            "GUID",
            FilterOperator::Equal,
            id.to_string(),
        )]))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    found.remove(0)
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    init_tracing();
    let db = setup_test_db().await.unwrap();
    let buildings = service::<building::Entity>(&db);

    let earlier = FixedClock(Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap());
    let model = building::Model {
        guid: Uuid::new_v4(),
        description: Some("Main hall".to_string()),
        floor_count: Some(4),
        gross_area: Some(1250.5),
        created_by: Some("facilities".to_string()),
        ..building::Model::new("B-100", &earlier)
    };

    let id = buildings.create(model.clone()).await.unwrap();
    assert_ne!(id, model.guid, "create assigns a fresh identifier");

    let stored = stored_building(&buildings, id).await;
    let expected = building::Model {
        guid: id,
        created_at: test_time(),
        updated_at: test_time(),
        ..model
    };
    assert_eq!(stored, expected);

    let projection = buildings.get_by_id(id, "*").await.unwrap().unwrap();
    assert_eq!(projection.get("GROSS_AREA"), Some(&json!(1250.5)));
    assert_eq!(projection.get("CREATED_BY"), Some(&json!("facilities")));
}

#[tokio::test]
async fn test_create_with_dates_round_trips() {
    init_tracing();
    let db = setup_test_db().await.unwrap();
    let tasks = service::<work_task::Entity>(&db);

    let due = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let model = work_task::Model {
        due_date: Some(due),
        estimated_hours: Some(3.5),
        ..work_task::Model::new("WT-1", 2, &test_clock())
    };
    let id = tasks.create(model).await.unwrap();

    let found = tasks
        .get(&ListQuery::new().with_filters(vec![FilterCriterion::new(
            "DUE_DATE",
            FilterOperator::Equal,
            "2024-06-30",
        )]))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].guid, id);
    assert_eq!(found[0].due_date, Some(due));
}

#[tokio::test]
async fn test_duplicate_business_key_is_conflict() {
    init_tracing();
    let db = setup_test_db().await.unwrap();
    seed_building(&db, "B-100", None).await;

    let err = service::<building::Entity>(&db)
        .create(building::Model::new("B-100", &test_clock()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }), "{err:?}");
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_replaces_all_columns() {
    init_tracing();
    let db = setup_test_db().await.unwrap();
    let buildings = service::<building::Entity>(&db);
    let id = seed_building(&db, "B-100", None).await;

    let replacement = building::Model {
        guid: Uuid::new_v4(),
        description: None,
        floor_count: Some(9),
        is_active: false,
        ..building::Model::new("B-200", &test_clock())
    };
    assert!(buildings.update(id, replacement).await.unwrap());

    let stored = stored_building(&buildings, id).await;
    assert_eq!(stored.guid, id, "the identifier is kept");
    assert_eq!(stored.id, "B-200");
    assert_eq!(stored.description, None);
    assert_eq!(stored.floor_count, Some(9));
    assert!(!stored.is_active);
}

#[tokio::test]
async fn test_update_missing_entity_is_not_found() {
    init_tracing();
    let db = setup_test_db().await.unwrap();

    let err = service::<building::Entity>(&db)
        .update(Uuid::new_v4(), building::Model::new("B-1", &test_clock()))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_changes_only_named_fields() {
    init_tracing();
    let db = setup_test_db().await.unwrap();
    let buildings = service::<building::Entity>(&db);
    let id = seed_building(&db, "B-100", None).await;

    let operations: Vec<PatchOperation> = serde_json::from_value(json!([
        { "op": "replace", "path": "/DESCRIPTION", "value": "East wing" },
        { "op": "add", "path": "/FLOOR_COUNT", "value": 3 }
    ]))
    .unwrap();
    assert!(buildings.patch(id, Some(&operations)).await.unwrap());

    let stored = stored_building(&buildings, id).await;
    assert_eq!(stored.description.as_deref(), Some("East wing"));
    assert_eq!(stored.floor_count, Some(3));
    assert_eq!(stored.id, "B-100");

    let remove = [PatchOperation::remove("/DESCRIPTION")];
    buildings.patch(id, Some(&remove)).await.unwrap();
    assert_eq!(stored_building(&buildings, id).await.description, None);
}

#[tokio::test]
async fn test_patch_errors() {
    init_tracing();
    let db = setup_test_db().await.unwrap();
    let buildings = service::<building::Entity>(&db);
    let id = seed_building(&db, "B-100", None).await;

    let err = buildings.patch(id, None).await.unwrap_err();
    assert!(err.is_validation());

    let operations = [PatchOperation::replace("/DESCRIPTION", "x")];
    let err = buildings
        .patch(Uuid::new_v4(), Some(&operations))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let operations = [PatchOperation::replace("/NOPE", "x")];
    let err = buildings.patch(id, Some(&operations)).await.unwrap_err();
    assert!(err.is_configuration());

    let operations = [PatchOperation::replace("/IS_ACTIVE", "definitely")];
    let err = buildings.patch(id, Some(&operations)).await.unwrap_err();
    assert!(err.is_validation());

    assert_eq!(
        stored_building(&buildings, id).await.description.as_deref(),
        Some("Building B-100"),
        "failed patches leave the entity untouched"
    );
}

#[tokio::test]
async fn test_delete_twice_is_not_found() {
    init_tracing();
    let db = setup_test_db().await.unwrap();
    let buildings = service::<building::Entity>(&db);
    let id = seed_building(&db, "B-100", None).await;

    assert!(buildings.delete(id).await.unwrap());
    assert!(buildings.get_by_id(id, "ID").await.unwrap().is_none());

    let err = buildings.delete(id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_count_follows_writes() {
    init_tracing();
    let db = setup_test_db().await.unwrap();
    let buildings = service::<building::Entity>(&db);

    let first = seed_building(&db, "B-1", None).await;
    seed_building(&db, "B-2", None).await;
    assert_eq!(buildings.count(None, None).await.unwrap(), 2);

    buildings.delete(first).await.unwrap();
    assert_eq!(buildings.count(None, None).await.unwrap(), 1);
    assert_eq!(buildings.count(None, Some("B-1")).await.unwrap(), 0);
}
