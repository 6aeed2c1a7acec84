#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use crudshape::CrudService;
use crudshape::clock::FixedClock;
use crudshape::entities::{building, equipment, person, work_task};
use sea_orm::{Database, DatabaseConnection, DbErr, Schema};
use sea_orm_migration::prelude::*;
use uuid::Uuid;

pub const FRUITS: [&str; 10] = [
    "Apple",
    "Banana",
    "Cherry",
    "Date",
    "Elderberry",
    "Fig",
    "Grape",
    "Honeydew",
    "Iceberg",
    "Jaguar",
];

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Route the crate's tracing events to the test output; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap()
}

pub fn test_clock() -> FixedClock {
    FixedClock(test_time())
}

pub fn service<R: crudshape::CrudResource>(db: &DatabaseConnection) -> CrudService<R> {
    CrudService::new(db.clone()).with_clock(test_clock())
}

/// Ten buildings `B-01`..`B-10` described by fruit name, with `FLOOR_COUNT` 1..=10.
pub async fn seed_fruit_buildings(db: &DatabaseConnection) -> Vec<Uuid> {
    let buildings = service::<building::Entity>(db);
    let mut ids = Vec::new();
    for (index, fruit) in FRUITS.iter().enumerate() {
        let floors = <i32 as TryFrom<usize>>::try_from(index + 1).unwrap();
        let model = building::Model {
            description: Some((*fruit).to_string()),
            floor_count: Some(floors),
            is_active: floors % 3 != 0,
            ..building::Model::new(format!("B-{floors:02}"), &test_clock())
        };
        ids.push(buildings.create(model).await.unwrap());
    }
    ids
}

pub async fn seed_person(db: &DatabaseConnection, id: &str, first: &str, last: &str) -> Uuid {
    service::<person::Entity>(db)
        .create(person::Model::new(id, first, last, &test_clock()))
        .await
        .unwrap()
}

pub async fn seed_building(db: &DatabaseConnection, id: &str, manager: Option<Uuid>) -> Uuid {
    let model = building::Model {
        description: Some(format!("Building {id}")),
        manager_guid: manager,
        ..building::Model::new(id, &test_clock())
    };
    service::<building::Entity>(db).create(model).await.unwrap()
}

pub async fn seed_equipment(
    db: &DatabaseConnection,
    id: &str,
    building: Option<Uuid>,
    custodian: Option<Uuid>,
) -> Uuid {
    let model = equipment::Model {
        description: Some(format!("Equipment {id}")),
        building_guid: building,
        custodian_guid: custodian,
        ..equipment::Model::new(id, &test_clock())
    };
    service::<equipment::Entity>(db).create(model).await.unwrap()
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateFacilityTables)]
    }
}

pub struct CreateFacilityTables;

impl MigrationName for CreateFacilityTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_facility_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateFacilityTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(person::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(building::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(equipment::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(work_task::Entity))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(work_task::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(equipment::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(building::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(person::Entity).to_owned())
            .await?;
        Ok(())
    }
}
