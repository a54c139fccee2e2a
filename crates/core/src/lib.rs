//! `docmgmt-core`: identity and error building blocks shared by every crate.
//!
//! This crate contains **pure domain** primitives (no storage, no session state).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{DocumentId, PermissionId, RoleId, UserId};
pub use value_object::ValueObject;
