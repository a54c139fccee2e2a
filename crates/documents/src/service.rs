use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use docmgmt_auth::{AccessController, AuthzError, Session, StoreError};
use docmgmt_core::{DocumentId, DomainError};

use crate::document::validate_title;
use crate::tokens::{DOCUMENT_CREATE, DOCUMENT_DELETE_OWN, DOCUMENT_EDIT_OWN, DOCUMENT_LIST_ALL};
use crate::{Document, DocumentStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    #[error("document {0} not found")]
    NotFound(DocumentId),

    #[error("document {0} belongs to another user")]
    NotOwner(DocumentId),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<AuthzError> for DocumentError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Unauthenticated => DocumentError::Unauthenticated,
            AuthzError::Forbidden(token) => DocumentError::Forbidden(token),
        }
    }
}

/// What the session may do with one particular document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentCapabilities {
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Document CRUD behind per-operation access policy.
///
/// | operation     | token                 | extra condition             |
/// |---------------|-----------------------|-----------------------------|
/// | list_visible  | `document:list:all`   | otherwise owner-filtered    |
/// | get           | `document:list:all`   | or caller owns the document |
/// | create        | `document:create`     |                             |
/// | update        | `document:edit:own`   | exists and caller owns it   |
/// | delete        | `document:delete:own` | exists and caller owns it   |
///
/// Reads never fail on policy: they narrow or come back empty. Mutations
/// fail with a [`DocumentError`] and leave the store untouched. There is no
/// `…:all` override for edit or delete.
#[derive(Debug, Clone)]
pub struct DocumentAccessService<S> {
    store: S,
}

impl<S: DocumentStore> DocumentAccessService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every document with `document:list:all`; otherwise only the caller's
    /// own. Empty without a session.
    pub fn list_visible(&self, session: Option<&Session>) -> Result<Vec<Document>, DocumentError> {
        let Some(session) = session else {
            return Ok(Vec::new());
        };

        let documents = if session.has_permission(DOCUMENT_LIST_ALL.as_str()) {
            self.store.list_all()?
        } else {
            self.store.list_by_owner(session.user_id())?
        };
        Ok(documents)
    }

    /// The document, if it exists and the caller may see it.
    ///
    /// "Absent" and "not yours" both come back as `Ok(None)` so a caller
    /// cannot probe for other users' document ids. Storage faults are errors.
    pub fn get(&self, session: Option<&Session>, id: DocumentId) -> Result<Option<Document>, DocumentError> {
        let Some(session) = session else {
            return Ok(None);
        };

        let document = self.store.find_by_id(id)?;
        Ok(document.filter(|doc| {
            let visible = session.has_permission(DOCUMENT_LIST_ALL.as_str()) || session.owns(doc.owner_id);
            if !visible {
                tracing::debug!(user_id = %session.user_id(), document_id = %id, "document hidden from caller");
            }
            visible
        }))
    }

    /// Create a draft owned by the caller.
    ///
    /// Owner and status are not parameters: the row always gets
    /// `owner_id = caller` and `status = DRAFT`.
    pub fn create(
        &self,
        session: Option<&Session>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Document, DocumentError> {
        AccessController::require(session, &DOCUMENT_CREATE)?;
        let session = session.ok_or(DocumentError::Unauthenticated)?;

        let title = title.into();
        validate_title(&title)?;

        let document = Document::draft(session.user_id(), title, content, Utc::now());
        self.store.insert(&document)?;

        tracing::info!(user_id = %session.user_id(), document_id = %document.id, "document created");
        Ok(document)
    }

    /// Replace title, content and status of a document the caller owns.
    ///
    /// `edit.id` selects the target. Its `owner_id` and `created_at` are
    /// ignored: the stored values win. Last write wins; there is no conflict
    /// detection between concurrent editors.
    pub fn update(&self, session: Option<&Session>, edit: &Document) -> Result<Document, DocumentError> {
        AccessController::require(session, &DOCUMENT_EDIT_OWN)?;
        let session = session.ok_or(DocumentError::Unauthenticated)?;

        validate_title(&edit.title)?;
        let original = self.owned_target(session, edit.id)?;

        let revised = original.revised(edit, Utc::now());
        if !self.store.update(&revised)? {
            return Err(DocumentError::NotFound(edit.id));
        }

        tracing::info!(user_id = %session.user_id(), document_id = %revised.id, "document updated");
        Ok(revised)
    }

    /// Delete a document the caller owns.
    pub fn delete(&self, session: Option<&Session>, id: DocumentId) -> Result<(), DocumentError> {
        AccessController::require(session, &DOCUMENT_DELETE_OWN)?;
        let session = session.ok_or(DocumentError::Unauthenticated)?;

        self.owned_target(session, id)?;
        if !self.store.delete(id)? {
            return Err(DocumentError::NotFound(id));
        }

        tracing::info!(user_id = %session.user_id(), document_id = %id, "document deleted");
        Ok(())
    }

    /// Same rule as `update`/`delete`, evaluated against a document the
    /// caller already holds (no store round-trip).
    pub fn capabilities(session: Option<&Session>, document: &Document) -> DocumentCapabilities {
        let owns = session.is_some_and(|s| s.owns(document.owner_id));
        DocumentCapabilities {
            can_edit: owns && AccessController::has_permission(session, &DOCUMENT_EDIT_OWN),
            can_delete: owns && AccessController::has_permission(session, &DOCUMENT_DELETE_OWN),
        }
    }

    fn owned_target(&self, session: &Session, id: DocumentId) -> Result<Document, DocumentError> {
        let document = self.store.find_by_id(id)?.ok_or(DocumentError::NotFound(id))?;
        if !session.owns(document.owner_id) {
            tracing::debug!(user_id = %session.user_id(), document_id = %id, "caller does not own document");
            return Err(DocumentError::NotOwner(id));
        }
        Ok(document)
    }
}
