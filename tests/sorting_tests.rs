use crudshape::config::ServiceConfig;
use crudshape::entities::building;
use crudshape::{CrudService, ListQuery};

mod common;
use common::{FRUITS, init_tracing, seed_fruit_buildings, service, setup_test_db};

async fn fruit_service() -> CrudService<building::Entity> {
    init_tracing();
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_fruit_buildings(&db).await;
    service(&db)
}

fn floors(models: &[building::Model]) -> Vec<i32> {
    models
        .iter()
        .map(|model| model.floor_count.unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_ascending_sort_is_monotonic() {
    let buildings = fruit_service().await;

    let found = buildings
        .get(&ListQuery::new().page(1, 100).sort_by("FLOOR_COUNT", "asc"))
        .await
        .unwrap();
    let floors = floors(&found);
    assert_eq!(floors.len(), 10);
    assert!(floors.windows(2).all(|pair| pair[0] <= pair[1]), "{floors:?}");
}

#[tokio::test]
async fn test_descending_sort_is_monotonic() {
    let buildings = fruit_service().await;

    let found = buildings
        .get(&ListQuery::new().page(1, 100).sort_by("DESCRIPTION", "DESC"))
        .await
        .unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|model| model.description.clone().unwrap_or_default())
        .collect();
    assert!(names.windows(2).all(|pair| pair[0] >= pair[1]), "{names:?}");
    assert_eq!(names.first().map(String::as_str), Some(FRUITS[9]));
}

#[tokio::test]
async fn test_sort_on_boolean_keeps_groups_together() {
    let buildings = fruit_service().await;

    let found = buildings
        .get(&ListQuery::new().page(1, 100).sort_by("IS_ACTIVE", "asc"))
        .await
        .unwrap();
    let flags: Vec<bool> = found.iter().map(|model| model.is_active).collect();
    // only the grouping is asserted; order within equal keys is unspecified
    assert!(flags.windows(2).all(|pair| pair[0] <= pair[1]), "{flags:?}");
    assert_eq!(flags.iter().filter(|active| !**active).count(), 3);
}

#[tokio::test]
async fn test_pagination_takes_the_requested_page() {
    let buildings = fruit_service().await;

    let page = buildings
        .get(&ListQuery::new().page(2, 3).sort_by("FLOOR_COUNT", "asc"))
        .await
        .unwrap();
    assert_eq!(floors(&page), [4, 5, 6]);

    let last = buildings
        .get(&ListQuery::new().page(4, 3).sort_by("FLOOR_COUNT", "asc"))
        .await
        .unwrap();
    assert_eq!(floors(&last), [10]);

    let beyond = buildings
        .get(&ListQuery::new().page(5, 3).sort_by("FLOOR_COUNT", "asc"))
        .await
        .unwrap();
    assert!(beyond.is_empty());
}

#[tokio::test]
async fn test_default_page_size_is_ten() {
    let buildings = fruit_service().await;
    buildings
        .create(building::Model::new("B-11", &common::test_clock()))
        .await
        .unwrap();

    let first = buildings.get(&ListQuery::new()).await.unwrap();
    assert_eq!(first.len(), 10);
}

#[tokio::test]
async fn test_page_number_zero_is_validation_error() {
    let buildings = fruit_service().await;

    let err = buildings.get(&ListQuery::new().page(0, 10)).await.unwrap_err();
    assert!(err.is_validation());

    let err = buildings.get(&ListQuery::new().page(1, 0)).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_page_size_above_maximum_is_rejected() {
    let buildings = fruit_service().await.with_config(ServiceConfig {
        max_page_size: 5,
        ..ServiceConfig::default()
    });

    assert_eq!(buildings.get(&ListQuery::new().page(1, 5)).await.unwrap().len(), 5);
    let err = buildings.get(&ListQuery::new().page(1, 6)).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_huge_page_number_is_validation_error() {
    let buildings = fruit_service().await;

    let err = buildings
        .get(&ListQuery::new().page(u64::MAX / 2, 10))
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err:?}");

    let err = buildings
        .get_projected(&ListQuery::new().page(u64::MAX, 10), "ID")
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err:?}");
}

#[tokio::test]
async fn test_paging_is_checked_before_filters() {
    let buildings = fruit_service().await;

    let query = ListQuery::new()
        .page(0, 10)
        .sort_by("NOPE", "asc");
    let err = buildings.get(&query).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_invalid_sort_order_is_validation_error() {
    let buildings = fruit_service().await;

    let err = buildings
        .get(&ListQuery::new().sort_by("FLOOR_COUNT", "sideways"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_unknown_sort_field_is_configuration_error() {
    let buildings = fruit_service().await;

    let err = buildings
        .get(&ListQuery::new().sort_by("NOPE", "asc"))
        .await
        .unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_empty_sort_field_ignores_order() {
    let buildings = fruit_service().await;

    let found = buildings
        .get(&ListQuery::new().page(1, 100).sort_by("", "sideways"))
        .await
        .unwrap();
    assert_eq!(found.len(), 10);
}
