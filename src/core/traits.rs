use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait};
use serde::{Serialize, de::DeserializeOwned};

use super::metadata::EntityMetadata;

/// A Sea-ORM entity that can be served by [`CrudService`](super::CrudService).
///
/// Implementors provide the identifier column, resource names used in error messages and
/// the lazily built [`EntityMetadata`] that maps runtime property names onto columns.
/// Models serialize to JSON objects whose keys are exactly the property names in that
/// table; projection and patching rely on it.
pub trait CrudResource: EntityTrait<Model: Serialize + DeserializeOwned + Sync> {
    type ActiveModelType: ActiveModelTrait<Entity = Self>
        + ActiveModelBehavior
        + From<Self::Model>
        + Send
        + Sync;

    /// Primary key column; always a GUID
    const ID_COLUMN: Self::Column;

    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    fn metadata() -> &'static EntityMetadata<Self::Column>;
}
