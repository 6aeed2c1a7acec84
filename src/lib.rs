//! Query shaping for facility CRUD services.
//!
//! Every entity is served by the same operations through [`CrudService`]. Per-entity code
//! is limited to the Sea-ORM entity and its [`EntityMetadata`] table; filtering, sorting,
//! projection and eager loading work off that table at runtime:
//!
//! - [`filtering::apply_filter`] turns filter criteria and a free-text term into a
//!   `WHERE` clause
//! - [`filtering::apply_sort`] orders by a property named at runtime
//! - [`projection::map_to_fields`] copies a requested field subset, following one hop of
//!   navigations
//! - [`includes::resolve_includes`] decides which navigations those fields need loaded

pub mod clock;
pub mod config;
pub mod core;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod includes;
pub mod models;
pub mod patch;
pub mod projection;

pub use crate::core::{CrudResource, CrudService, EntityMetadata, EntityQuery};
pub use errors::ApiError;
pub use filtering::{FilterCriterion, FilterOperator};
pub use models::{ListParams, ListQuery};
pub use projection::{EntityGraph, Projection};
