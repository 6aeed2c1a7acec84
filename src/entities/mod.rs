//! Facility entities served through [`CrudService`](crate::core::CrudService).
//!
//! Each module is the usual Sea-ORM entity plus a [`CrudResource`](crate::core::CrudResource)
//! impl holding its metadata table. Column names are the upper-case property names used
//! by filters, sorts, projections and patches.

pub mod building;
pub mod equipment;
pub mod person;
pub mod work_task;
