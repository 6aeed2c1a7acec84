use std::sync::LazyLock;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::core::{CrudResource, EntityMetadata};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "PERSON")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "GUID")]
    pub guid: Uuid,
    #[sea_orm(unique, column_name = "ID")]
    pub id: String,
    #[sea_orm(column_name = "FIRST_NAME")]
    pub first_name: String,
    #[sea_orm(column_name = "LAST_NAME")]
    pub last_name: String,
    #[sea_orm(column_name = "EMAIL")]
    pub email: Option<String>,
    #[sea_orm(column_name = "PHONE")]
    pub phone: Option<String>,
    #[sea_orm(column_name = "IS_ACTIVE")]
    pub is_active: bool,
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
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        clock: &dyn Clock,
    ) -> Self {
        let now = clock.now();
        Self {
            guid: Uuid::nil(),
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            phone: None,
            is_active: true,
            created_at: now,
            created_by: None,
            updated_at: now,
            updated_by: None,
        }
    }
}

// PHONE is left out of free-text search
static METADATA: LazyLock<EntityMetadata<Column>> = LazyLock::new(|| {
    EntityMetadata::from_columns(Column::Guid)
        .with_searchable(&["ID", "FIRST_NAME", "LAST_NAME", "EMAIL"])
        .with_audit(Column::CreatedAt, Column::UpdatedAt)
});

impl CrudResource for Entity {
    type ActiveModelType = ActiveModel;

    const ID_COLUMN: Column = Column::Guid;
    const RESOURCE_NAME_SINGULAR: &'static str = "person";
    const RESOURCE_NAME_PLURAL: &'static str = "persons";

    fn metadata() -> &'static EntityMetadata<Column> {
        &METADATA
    }
}
