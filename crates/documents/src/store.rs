use std::sync::Arc;

use docmgmt_auth::StoreError;
use docmgmt_core::{DocumentId, UserId};

use crate::Document;

/// Document persistence contract.
///
/// Listing order is up to the backend. `update` and `delete` return whether a
/// row was affected; `false` means the target was not there.
pub trait DocumentStore: Send + Sync {
    fn list_all(&self) -> Result<Vec<Document>, StoreError>;
    fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Document>, StoreError>;
    fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>, StoreError>;
    fn insert(&self, document: &Document) -> Result<(), StoreError>;
    /// Overwrite title, content, status and updated-at of an existing row.
    fn update(&self, document: &Document) -> Result<bool, StoreError>;
    fn delete(&self, id: DocumentId) -> Result<bool, StoreError>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        (**self).list_all()
    }

    fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Document>, StoreError> {
        (**self).list_by_owner(owner_id)
    }

    fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        (**self).find_by_id(id)
    }

    fn insert(&self, document: &Document) -> Result<(), StoreError> {
        (**self).insert(document)
    }

    fn update(&self, document: &Document) -> Result<bool, StoreError> {
        (**self).update(document)
    }

    fn delete(&self, id: DocumentId) -> Result<bool, StoreError> {
        (**self).delete(id)
    }
}
