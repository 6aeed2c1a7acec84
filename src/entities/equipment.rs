use std::sync::LazyLock;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{building, person};
use crate::clock::Clock;
use crate::core::{CrudResource, EntityMetadata, Navigation};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "EQUIPMENT")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "GUID")]
    pub guid: Uuid,
    #[sea_orm(unique, column_name = "ID")]
    pub id: String,
    #[sea_orm(column_name = "DESCRIPTION")]
    pub description: Option<String>,
    #[sea_orm(column_name = "SERIAL_NUMBER")]
    pub serial_number: Option<String>,
    #[sea_orm(column_name = "PURCHASE_COST")]
    pub purchase_cost: Option<f64>,
    #[sea_orm(column_name = "INSTALLED_AT")]
    pub installed_at: Option<DateTimeUtc>,
    #[sea_orm(column_name = "BUILDING_GUID")]
    pub building_guid: Option<Uuid>,
    #[sea_orm(column_name = "CUSTODIAN_GUID")]
    pub custodian_guid: Option<Uuid>,
    #[sea_orm(column_name = "CREATED_AT")]
    pub created_at: DateTimeUtc,
    #[sea_orm(column_name = "CREATED_BY")]
    pub created_by: Option<String>,
    #[sea_orm(column_name = "UPDATED_AT")]
    pub updated_at: DateTimeUtc,
    #[sea_orm(column_name = "UPDATED_BY")]
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[must_use]
    pub fn new(id: impl Into<String>, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            guid: Uuid::nil(),
            id: id.into(),
            description: None,
            serial_number: None,
            purchase_cost: None,
            installed_at: None,
            building_guid: None,
            custodian_guid: None,
            created_at: now,
            created_by: None,
            updated_at: now,
            updated_by: None,
        }
    }
}

static METADATA: LazyLock<EntityMetadata<Column>> = LazyLock::new(|| {
    EntityMetadata::from_columns(Column::Guid)
        .with_searchable(&["ID", "DESCRIPTION", "SERIAL_NUMBER"])
        .with_navigation(Navigation::belongs_to::<building::Entity>(
            "Building",
            Column::BuildingGuid,
        ))
        .with_navigation(Navigation::belongs_to::<person::Entity>(
            "Custodian",
            Column::CustodianGuid,
        ))
        .with_audit(Column::CreatedAt, Column::UpdatedAt)
});

impl CrudResource for Entity {
    type ActiveModelType = ActiveModel;

    const ID_COLUMN: Column = Column::Guid;
    const RESOURCE_NAME_SINGULAR: &'static str = "equipment";
    const RESOURCE_NAME_PLURAL: &'static str = "equipment";

    fn metadata() -> &'static EntityMetadata<Column> {
        &METADATA
    }
}
