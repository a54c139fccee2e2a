use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use docmgmt_auth::StoreError;
use docmgmt_core::{DocumentId, UserId};
use docmgmt_documents::{Document, DocumentStore};

/// In-memory document table for tests and demos.
///
/// Listings are newest-first (`created_at` descending, id as tie-break), the
/// same order the SQL backend returns.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<HashMap<DocumentId, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<DocumentId, Document>>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<DocumentId, Document>>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

fn newest_first(mut docs: Vec<Document>) -> Vec<Document> {
    docs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    docs
}

impl DocumentStore for InMemoryDocumentStore {
    fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(newest_first(self.read()?.values().cloned().collect()))
    }

    fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Document>, StoreError> {
        Ok(newest_first(
            self.read()?
                .values()
                .filter(|d| d.owner_id == owner_id)
                .cloned()
                .collect(),
        ))
    }

    fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn insert(&self, document: &Document) -> Result<(), StoreError> {
        let mut rows = self.write()?;
        if rows.contains_key(&document.id) {
            return Err(StoreError::Query(format!("document {} already exists", document.id)));
        }
        rows.insert(document.id, document.clone());
        Ok(())
    }

    fn update(&self, document: &Document) -> Result<bool, StoreError> {
        let mut rows = self.write()?;
        let Some(row) = rows.get_mut(&document.id) else {
            return Ok(false);
        };
        row.title.clone_from(&document.title);
        row.content.clone_from(&document.content);
        row.status = document.status.clone();
        row.updated_at = document.updated_at;
        Ok(true)
    }

    fn delete(&self, id: DocumentId) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(&id).is_some())
    }
}
