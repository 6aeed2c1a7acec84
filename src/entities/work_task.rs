use std::sync::LazyLock;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{equipment, person};
use crate::clock::Clock;
use crate::core::{CrudResource, EntityMetadata, Navigation};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "WORK_TASK")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "GUID")]
    pub guid: Uuid,
    #[sea_orm(unique, column_name = "ID")]
    pub id: String,
    #[sea_orm(column_name = "DESCRIPTION")]
    pub description: Option<String>,
    #[sea_orm(column_name = "PRIORITY")]
    pub priority: i32,
    #[sea_orm(column_name = "IS_COMPLETE")]
    pub is_complete: bool,
    #[sea_orm(column_name = "DUE_DATE")]
    pub due_date: Option<Date>,
    #[sea_orm(column_name = "ESTIMATED_HOURS")]
    pub estimated_hours: Option<f64>,
    #[sea_orm(column_name = "EQUIPMENT_GUID")]
    pub equipment_guid: Option<Uuid>,
    #[sea_orm(column_name = "ASSIGNEE_GUID")]
    pub assignee_guid: Option<Uuid>,
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
    pub fn new(id: impl Into<String>, priority: i32, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            guid: Uuid::nil(),
            id: id.into(),
            description: None,
            priority,
            is_complete: false,
            due_date: None,
            estimated_hours: None,
            equipment_guid: None,
            assignee_guid: None,
            created_at: now,
            created_by: None,
            updated_at: now,
            updated_by: None,
        }
    }
}

static METADATA: LazyLock<EntityMetadata<Column>> = LazyLock::new(|| {
    EntityMetadata::from_columns(Column::Guid)
        .with_searchable(&["ID", "DESCRIPTION"])
        .with_navigation(Navigation::belongs_to::<equipment::Entity>(
            "Equipment",
            Column::EquipmentGuid,
        ))
        .with_navigation(Navigation::belongs_to::<person::Entity>(
            "Assignee",
            Column::AssigneeGuid,
        ))
        .with_audit(Column::CreatedAt, Column::UpdatedAt)
});

impl CrudResource for Entity {
    type ActiveModelType = ActiveModel;

    const ID_COLUMN: Column = Column::Guid;
    const RESOURCE_NAME_SINGULAR: &'static str = "work task";
    const RESOURCE_NAME_PLURAL: &'static str = "work tasks";

    fn metadata() -> &'static EntityMetadata<Column> {
        &METADATA
    }
}
