//! Authenticated sessions and the manager that owns the current one.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;

use docmgmt_core::UserId;

use crate::credential::{Credential, CredentialHasher};
use crate::resolver::PermissionResolver;
use crate::store::{PermissionStore, StoreError, UserStore};
use crate::{PermissionToken, User};

/// An authenticated identity plus the permission snapshot taken at login.
///
/// Sessions are immutable. Role or permission changes made while a session
/// is alive are not observed until the user authenticates again.
///
/// There is no `Default`: a session without a user does not
/// exist. "Nobody is logged in" is `Option::<&Session>::None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
    permissions: HashSet<PermissionToken>,
    authenticated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User, permissions: HashSet<PermissionToken>, authenticated_at: DateTime<Utc>) -> Self {
        Self {
            user,
            permissions,
            authenticated_at,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn permissions(&self) -> &HashSet<PermissionToken> {
        &self.permissions
    }

    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }

    /// Exact-match membership test against the snapshot.
    pub fn has_permission(&self, token: &str) -> bool {
        self.permissions.contains(token)
    }

    /// Ownership check: is `owner` the user behind this session?
    pub fn owns(&self, owner: UserId) -> bool {
        self.user.id == owner
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown username or wrong credential. The two are indistinguishable.
    #[error("authentication failed")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Holds at most one authenticated session for a client context.
///
/// States: `Unauthenticated` (initial, after logout) and
/// `Authenticated(session)`. One manager per connection/context; the current
/// session sits behind a `RwLock` so a manager can still be shared between
/// threads of the same context.
pub struct SessionManager<U, P> {
    users: U,
    resolver: PermissionResolver<P>,
    hasher: CredentialHasher,
    current: RwLock<Option<Arc<Session>>>,
    // Verified against when the username is unknown, so both failure paths
    // cost one Argon2 run.
    decoy: OnceLock<Option<Credential>>,
}

impl<U, P> SessionManager<U, P>
where
    U: UserStore,
    P: PermissionStore,
{
    pub fn new(users: U, permissions: P) -> Self {
        Self::with_hasher(users, permissions, CredentialHasher::new())
    }

    pub fn with_hasher(users: U, permissions: P, hasher: CredentialHasher) -> Self {
        Self {
            users,
            resolver: PermissionResolver::new(permissions),
            hasher,
            current: RwLock::new(None),
            decoy: OnceLock::new(),
        }
    }

    /// Verify `username`/`credential` and, on success, replace the current
    /// session with a fresh one (new permission snapshot).
    ///
    /// On any failure the current state is left untouched.
    pub fn authenticate(&self, username: &str, credential: &str) -> Result<Arc<Session>, AuthError> {
        let Some(user) = self.users.find_by_username(username)? else {
            self.burn_decoy(credential);
            tracing::warn!(username, "authentication failed");
            return Err(AuthError::InvalidCredentials);
        };

        match self.hasher.verify(&user.credential, credential) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(username, "authentication failed");
                return Err(AuthError::InvalidCredentials);
            }
            // Reported to the caller like a wrong password; only the log
            // says the stored hash is unusable.
            Err(err) => {
                tracing::error!(username, error = %err, "stored credential unusable");
                return Err(AuthError::InvalidCredentials);
            }
        }

        let permissions = self.resolver.resolve(user.id)?;
        let session = Arc::new(Session::new(user, permissions, Utc::now()));

        let previous = self.write_current().replace(session.clone());
        tracing::info!(
            user_id = %session.user_id(),
            username = %session.user().username,
            permissions = session.permissions().len(),
            replaced = previous.is_some(),
            "user authenticated"
        );

        Ok(session)
    }

    /// Return to `Unauthenticated`. Idempotent; yields the session that ended, if any.
    pub fn logout(&self) -> Option<Arc<Session>> {
        let previous = self.write_current().take();
        if let Some(session) = &previous {
            tracing::info!(user_id = %session.user_id(), "user logged out");
        }
        previous
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current().map(|s| s.user().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn resolver(&self) -> &PermissionResolver<P> {
        &self.resolver
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    fn write_current(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<Session>>> {
        // The guarded value is a plain Option; a panic elsewhere cannot leave
        // it half-written.
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn burn_decoy(&self, credential: &str) {
        let decoy = self
            .decoy
            .get_or_init(|| self.hasher.hash("docmgmt-decoy-credential").ok());
        if let Some(decoy) = decoy {
            let _ = self.hasher.verify(decoy, credential);
        }
    }
}

impl<U, P> core::fmt::Debug for SessionManager<U, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let user_id = self
            .current
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.user_id()));
        f.debug_struct("SessionManager")
            .field("current_user", &user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Directory {
        users: Vec<User>,
        grants: Mutex<HashMap<UserId, HashSet<PermissionToken>>>,
        offline: bool,
    }

    impl Directory {
        fn add(&mut self, hasher: &CredentialHasher, username: &str, password: &str, tokens: &[&'static str]) -> UserId {
            let user = User::new(username, format!("{username}@example.com"), hasher.hash(password).unwrap());
            let id = user.id;
            self.users.push(user);
            self.grants
                .lock()
                .unwrap()
                .insert(id, tokens.iter().map(|&t| PermissionToken::from_static(t)).collect());
            id
        }

        fn regrant(&self, user: UserId, tokens: &[&'static str]) {
            self.grants
                .lock()
                .unwrap()
                .insert(user, tokens.iter().map(|&t| PermissionToken::from_static(t)).collect());
        }
    }

    impl UserStore for Directory {
        fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
            if self.offline {
                return Err(StoreError::Unavailable("directory offline".into()));
            }
            Ok(self.users.iter().find(|u| u.username == username).cloned())
        }

        fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
            Ok(self.users.iter().find(|u| u.id == id).cloned())
        }
    }

    impl PermissionStore for Directory {
        fn list_permission_tokens(&self, user_id: UserId) -> Result<HashSet<PermissionToken>, StoreError> {
            Ok(self.grants.lock().unwrap().get(&user_id).cloned().unwrap_or_default())
        }
    }

    fn manager(directory: Directory) -> (SessionManager<Arc<Directory>, Arc<Directory>>, Arc<Directory>) {
        let directory = Arc::new(directory);
        let manager = SessionManager::with_hasher(directory.clone(), directory.clone(), CredentialHasher::insecure_fast());
        (manager, directory)
    }

    fn fixture() -> (SessionManager<Arc<Directory>, Arc<Directory>>, Arc<Directory>, UserId, UserId) {
        let hasher = CredentialHasher::insecure_fast();
        let mut directory = Directory::default();
        let alice = directory.add(&hasher, "alice", "alice-pw", &[]);
        let bob = directory.add(&hasher, "bob", "bob-pw", &["document:create", "document:list:all"]);
        let (manager, directory) = manager(directory);
        (manager, directory, alice, bob)
    }

    #[test]
    fn starts_unauthenticated() {
        let (manager, ..) = fixture();
        assert!(!manager.is_authenticated());
        assert!(manager.current_user().is_none());
    }

    #[test]
    fn successful_login_snapshots_resolved_permissions() {
        let (manager, _, _, bob) = fixture();

        let session = manager.authenticate("bob", "bob-pw").unwrap();

        assert_eq!(session.user_id(), bob);
        assert_eq!(manager.current_user().unwrap().id, bob);
        let expected: HashSet<PermissionToken> = ["document:create", "document:list:all"]
            .into_iter()
            .map(PermissionToken::from_static)
            .collect();
        assert_eq!(session.permissions(), &expected);
    }

    #[test]
    fn user_without_roles_authenticates_with_empty_snapshot() {
        let (manager, _, alice, _) = fixture();

        let session = manager.authenticate("alice", "alice-pw").unwrap();

        assert_eq!(session.user_id(), alice);
        assert!(session.permissions().is_empty());
        assert!(!session.has_permission("document:create"));
    }

    #[test]
    fn wrong_password_and_unknown_user_fail_identically() {
        let (manager, ..) = fixture();

        let wrong = manager.authenticate("bob", "nope").unwrap_err();
        let unknown = manager.authenticate("mallory", "bob-pw").unwrap_err();

        assert_eq!(wrong, AuthError::InvalidCredentials);
        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn unusable_stored_hash_fails_like_a_wrong_password() {
        let mut directory = Directory::default();
        directory
            .users
            .push(User::new("carol", "carol@example.com", Credential::from_phc("not-a-phc-string")));
        let (manager, _) = manager(directory);

        let err = manager.authenticate("carol", "anything").unwrap_err();

        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn failed_login_keeps_the_existing_session() {
        let (manager, _, _, bob) = fixture();
        manager.authenticate("bob", "bob-pw").unwrap();

        assert!(manager.authenticate("alice", "wrong").is_err());

        assert_eq!(manager.current_user().unwrap().id, bob);
    }

    #[test]
    fn new_login_replaces_prior_session() {
        let (manager, _, alice, _) = fixture();
        manager.authenticate("bob", "bob-pw").unwrap();

        manager.authenticate("alice", "alice-pw").unwrap();

        assert_eq!(manager.current_user().unwrap().id, alice);
    }

    #[test]
    fn snapshot_is_not_refreshed_until_next_login() {
        let (manager, directory, _, bob) = fixture();
        let session = manager.authenticate("bob", "bob-pw").unwrap();

        directory.regrant(bob, &["user:manage"]);

        assert!(session.has_permission("document:create"));
        assert!(manager.current().unwrap().has_permission("document:create"));
        assert!(!manager.current().unwrap().has_permission("user:manage"));

        let refreshed = manager.authenticate("bob", "bob-pw").unwrap();
        assert!(refreshed.has_permission("user:manage"));
        assert!(!refreshed.has_permission("document:create"));
    }

    #[test]
    fn logout_is_idempotent() {
        let (manager, ..) = fixture();
        manager.authenticate("bob", "bob-pw").unwrap();

        assert!(manager.logout().is_some());
        assert!(manager.logout().is_none());
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn storage_fault_is_reported_and_state_unchanged() {
        let hasher = CredentialHasher::insecure_fast();
        let mut directory = Directory::default();
        directory.add(&hasher, "bob", "bob-pw", &[]);
        directory.offline = true;
        let (manager, _) = manager(directory);

        let err = manager.authenticate("bob", "bob-pw").unwrap_err();

        assert!(matches!(err, AuthError::Storage(StoreError::Unavailable(_))));
        assert!(!manager.is_authenticated());
    }
}
