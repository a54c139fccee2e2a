use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docmgmt_core::{DocumentId, DomainError, DomainResult, Entity, UserId, ValueObject};

/// Document status.
///
/// A free-form token chosen by the caller on update. The only status the
/// system itself assigns is [`DocumentStatus::DRAFT`], at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentStatus(Cow<'static, str>);

impl DocumentStatus {
    pub const DRAFT: DocumentStatus = DocumentStatus(Cow::Borrowed("DRAFT"));

    /// Wrap a status as given. Stored rows come back through here, so
    /// anything `update` accepted reads back unchanged.
    pub fn new(status: impl Into<Cow<'static, str>>) -> Self {
        Self(status.into())
    }

    /// Stricter constructor for form input: non-empty, no whitespace.
    pub fn parse(status: &str) -> Result<Self, DomainError> {
        if status.is_empty() || status.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(format!("invalid document status '{status}'")));
        }
        Ok(Self(Cow::Owned(status.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_draft(&self) -> bool {
        *self == Self::DRAFT
    }
}

impl Default for DocumentStatus {
    fn default() -> Self {
        Self::DRAFT
    }
}

impl ValueObject for DocumentStatus {}

impl core::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored document.
///
/// # Invariants
/// - `owner_id` is set once at creation and never reassigned.
/// - `created_at <= updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub owner_id: UserId,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// A fresh draft owned by `owner_id`.
    pub fn draft(owner_id: UserId, title: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: DocumentId::new(),
            title: title.into(),
            content: content.into(),
            owner_id,
            status: DocumentStatus::DRAFT,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Apply the caller-editable fields of `edit` onto this row.
    ///
    /// Identity, owner and creation time are kept from `self`.
    pub fn revised(&self, edit: &Document, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            title: edit.title.clone(),
            content: edit.content.clone(),
            owner_id: self.owner_id,
            status: edit.status.clone(),
            created_at: self.created_at,
            updated_at: now.max(self.created_at),
        }
    }
}

impl Entity for Document {
    type Id = DocumentId;

    fn id(&self) -> DocumentId {
        self.id
    }
}

pub(crate) fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("document title cannot be empty"));
    }
    Ok(())
}
