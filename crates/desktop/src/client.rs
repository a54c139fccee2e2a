//! The facade the presentation layer talks to.
//!
//! Every call reads the current session from the [`SessionManager`] and hands
//! it to the policy layer explicitly. Views never touch stores directly.

use std::sync::Arc;

use anyhow::Context;

use docmgmt_auth::{
    AccessController, AuthError, AuthorizationExplanation, PermissionStore, RoleStore, Session, SessionManager,
    StoreError, UserStore,
};
use docmgmt_core::DocumentId;
use docmgmt_documents::tokens::{DOCUMENT_CREATE, DOCUMENT_LIST_ALL};
use docmgmt_documents::{Document, DocumentAccessService, DocumentError, DocumentStore};
use docmgmt_events::{ClientNotification, DocumentChange, EventBus, InMemoryEventBus, Subscription};
use docmgmt_infra::SqliteStore;

use crate::config::ClientConfig;
use crate::types::{Capabilities, DocumentCapabilities, USER_MANAGE, UserView};

/// A client backed by one SQLite database for users, grants and documents.
pub type SqliteClient = DesktopClient<Arc<SqliteStore>, Arc<SqliteStore>, Arc<SqliteStore>>;

pub struct DesktopClient<U, P, D> {
    sessions: SessionManager<U, P>,
    documents: DocumentAccessService<D>,
    bus: Arc<InMemoryEventBus<ClientNotification>>,
}

impl SqliteClient {
    /// Install logging, open the configured database and wire a client on it.
    pub fn open(config: &ClientConfig) -> anyhow::Result<Self> {
        docmgmt_observability::init_with(&config.log);

        let store = Arc::new(SqliteStore::open(&config.store).context("failed to open document database")?);
        Ok(Self::new(
            SessionManager::new(store.clone(), store.clone()),
            DocumentAccessService::new(store),
        ))
    }
}

impl<U, P, D> DesktopClient<U, P, D>
where
    U: UserStore,
    P: PermissionStore,
    D: DocumentStore,
{
    pub fn new(sessions: SessionManager<U, P>, documents: DocumentAccessService<D>) -> Self {
        Self::with_bus(sessions, documents, Arc::new(InMemoryEventBus::new()))
    }

    pub fn with_bus(
        sessions: SessionManager<U, P>,
        documents: DocumentAccessService<D>,
        bus: Arc<InMemoryEventBus<ClientNotification>>,
    ) -> Self {
        Self {
            sessions,
            documents,
            bus,
        }
    }

    // ── session ─────────────────────────────────────────────────────────────

    pub fn login(&self, username: &str, password: &str) -> Result<UserView, AuthError> {
        let session = self.sessions.authenticate(username, password)?;
        self.notify(ClientNotification::session_started(session.user_id()));
        Ok(UserView::from(session.user()))
    }

    /// `true` if a session was actually ended.
    pub fn logout(&self) -> bool {
        let ended = self.sessions.logout().is_some();
        if ended {
            self.notify(ClientNotification::session_ended());
        }
        ended
    }

    pub fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated()
    }

    pub fn current_user(&self) -> Option<UserView> {
        self.sessions.current().map(|s| UserView::from(s.user()))
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.sessions.current()
    }

    pub fn has_permission(&self, token: &str) -> bool {
        AccessController::has_permission(self.session().as_deref(), token)
    }

    /// `"Welcome, <username>"` while signed in.
    pub fn welcome_message(&self) -> Option<String> {
        self.sessions
            .current()
            .map(|s| format!("Welcome, {}", s.user().username))
    }

    pub fn capabilities(&self) -> Capabilities {
        let session = self.session();
        let session = session.as_deref();
        Capabilities {
            can_create: AccessController::has_permission(session, &DOCUMENT_CREATE),
            can_view_all: AccessController::has_permission(session, &DOCUMENT_LIST_ALL),
            can_manage_users: AccessController::has_permission(session, &USER_MANAGE),
        }
    }

    // ── documents ───────────────────────────────────────────────────────────

    pub fn documents(&self) -> Result<Vec<Document>, DocumentError> {
        self.documents.list_visible(self.session().as_deref())
    }

    pub fn document(&self, id: DocumentId) -> Result<Option<Document>, DocumentError> {
        self.documents.get(self.session().as_deref(), id)
    }

    pub fn create_document(&self, title: &str, content: &str) -> Result<Document, DocumentError> {
        let created = self.documents.create(self.session().as_deref(), title, content)?;
        self.notify(ClientNotification::documents_changed(DocumentChange::Created, created.id));
        Ok(created)
    }

    pub fn update_document(&self, edit: &Document) -> Result<Document, DocumentError> {
        let updated = self.documents.update(self.session().as_deref(), edit)?;
        self.notify(ClientNotification::documents_changed(DocumentChange::Updated, updated.id));
        Ok(updated)
    }

    pub fn delete_document(&self, id: DocumentId) -> Result<(), DocumentError> {
        self.documents.delete(self.session().as_deref(), id)?;
        self.notify(ClientNotification::documents_changed(DocumentChange::Deleted, id));
        Ok(())
    }

    /// Edit/delete switches for the currently selected document.
    pub fn document_capabilities(&self, document: &Document) -> DocumentCapabilities {
        DocumentAccessService::<D>::capabilities(self.session().as_deref(), document)
    }

    // ── notifications ───────────────────────────────────────────────────────

    pub fn subscribe(&self) -> Subscription<ClientNotification> {
        self.bus.subscribe()
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus<ClientNotification>> {
        &self.bus
    }

    fn notify(&self, notification: ClientNotification) {
        // The operation already succeeded; a dead bus only costs the refresh.
        if let Err(err) = self.bus.publish(notification) {
            tracing::warn!(error = ?err, "failed to publish client notification");
        }
    }
}

impl<U, P, D> DesktopClient<U, P, D>
where
    U: UserStore,
    P: PermissionStore + RoleStore,
    D: DocumentStore,
{
    /// Why the current session would pass or fail a check on `token`.
    ///
    /// A backend failure while loading the caller's roles is returned, not
    /// rendered as "no roles".
    pub fn explain(&self, token: &str) -> Result<AuthorizationExplanation, StoreError> {
        let session = self.session();
        let roles = match &session {
            Some(s) => self.sessions.resolver().roles(s.user_id())?,
            None => Vec::new(),
        };
        Ok(AccessController::explain(session.as_deref(), token, &roles))
    }
}

impl<U, P, D> core::fmt::Debug for DesktopClient<U, P, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DesktopClient")
            .field("sessions", &self.sessions)
            .field("subscribers", &self.bus.subscriber_count())
            .finish_non_exhaustive()
    }
}
