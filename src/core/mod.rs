pub mod metadata;
pub mod query;
pub mod service;
pub mod traits;

pub use metadata::{AuditColumns, EntityMetadata, FieldDef, FieldKind, Navigation};
pub use query::EntityQuery;
pub use service::CrudService;
pub use traits::CrudResource;
