//! View types handed to the presentation layer.
//!
//! These are plain serializable values: no store handles, no credential
//! material.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docmgmt_auth::{PermissionToken, User};
use docmgmt_core::UserId;

pub use docmgmt_documents::DocumentCapabilities;

/// Grants access to user administration screens.
pub const USER_MANAGE: PermissionToken = PermissionToken::from_static("user:manage");

/// The signed-in account, minus its credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Session-wide UI switches derived from the permission snapshot.
///
/// All `false` when nobody is signed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_create: bool,
    pub can_view_all: bool,
    pub can_manage_users: bool,
}

#[cfg(test)]
mod tests {
    use docmgmt_auth::Credential;

    use super::*;

    #[test]
    fn user_view_never_carries_the_credential() {
        let user = User::new("bob", "bob@example.com", Credential::from_phc("$argon2id$secret-material"));

        let json = serde_json::to_string(&UserView::from(&user)).unwrap();

        assert!(json.contains("\"username\":\"bob\""));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn capabilities_default_to_nothing() {
        let caps = Capabilities::default();
        assert!(!caps.can_create && !caps.can_view_all && !caps.can_manage_users);
    }
}
