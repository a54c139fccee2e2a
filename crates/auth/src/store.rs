//! Collaborator contracts the authorization core reads through.
//!
//! Implementations live outside this crate (in-memory, SQLite, ...). Every
//! method reports backend trouble as [`StoreError`] instead of folding it into
//! "not found" or "empty".

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use docmgmt_core::UserId;

use crate::{PermissionToken, Role, User};

/// Persistence failure, distinct from "absent" and from "denied".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or opened.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A query or statement failed.
    #[error("storage query failed: {0}")]
    Query(String),

    /// A row could not be mapped back into a domain value.
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),

    /// An in-process lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

pub trait UserStore: Send + Sync {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
}

/// Role → permission resolution, joined in the backend.
pub trait PermissionStore: Send + Sync {
    /// Every token granted to `user_id` through any of its roles.
    ///
    /// A user without roles yields an empty set.
    fn list_permission_tokens(&self, user_id: UserId) -> Result<HashSet<PermissionToken>, StoreError>;
}

pub trait RoleStore: Send + Sync {
    /// Roles assigned to `user_id`, in no particular order.
    fn list_roles(&self, user_id: UserId) -> Result<Vec<Role>, StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_username(username)
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id)
    }
}

impl<S> PermissionStore for Arc<S>
where
    S: PermissionStore + ?Sized,
{
    fn list_permission_tokens(&self, user_id: UserId) -> Result<HashSet<PermissionToken>, StoreError> {
        (**self).list_permission_tokens(user_id)
    }
}

impl<S> RoleStore for Arc<S>
where
    S: RoleStore + ?Sized,
{
    fn list_roles(&self, user_id: UserId) -> Result<Vec<Role>, StoreError> {
        (**self).list_roles(user_id)
    }
}
