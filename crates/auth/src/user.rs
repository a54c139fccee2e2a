//! User accounts as seen by the authorization core.
//!
//! The core only reads users. Creating accounts and rotating credentials is
//! the persistence layer's job; [`NewUser`] is the value it is handed.

use chrono::{DateTime, Utc};

use docmgmt_core::{DomainError, Entity, UserId};

use crate::credential::Credential;

/// A user account.
///
/// # Invariants
/// - `id` and `username` never change once the row exists.
/// - `credential` is an Argon2 PHC hash, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>, credential: Credential) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            credential,
            created_at: Utc::now(),
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Validated input for account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl NewUser {
    /// Trim and validate account fields.
    ///
    /// Usernames are kept case-sensitive (lookups are exact); emails are
    /// lowercased.
    pub fn parse(username: &str, email: &str) -> Result<Self, DomainError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if username.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("username cannot contain whitespace"));
        }

        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self {
            username: username.to_string(),
            email: email.to_lowercase(),
        })
    }

    pub fn into_user(self, credential: Credential) -> User {
        User::new(self.username, self.email, credential)
    }
}
