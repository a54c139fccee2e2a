//! Errors raised while provisioning users, roles and grants.
//!
//! Provisioning is an administrative path (tests, demos, first-run setup);
//! the authorization core itself only ever reads.

use thiserror::Error;

use docmgmt_auth::{CredentialError, StoreError};
use docmgmt_core::{DomainError, PermissionId, RoleId, UserId};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("{kind} '{name}' already exists")]
    Duplicate { kind: &'static str, name: String },

    #[error("unknown user {0}")]
    UnknownUser(UserId),

    #[error("unknown role {0}")]
    UnknownRole(RoleId),

    #[error("unknown permission {0}")]
    UnknownPermission(PermissionId),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl SeedError {
    pub(crate) fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            name: name.into(),
        }
    }
}
