use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use docmgmt_auth::{
    CredentialHasher, NewUser, Permission, PermissionStore, PermissionToken, Role, RoleStore, StoreError, User,
    UserStore,
};
use docmgmt_core::{PermissionId, RoleId, UserId};

use crate::seed::SeedError;

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    user_roles: HashSet<(UserId, RoleId)>,
    role_permissions: HashSet<(RoleId, PermissionId)>,
}

/// In-memory user/role/permission directory for tests and demos.
///
/// Mirrors the relational layout (two join tables) so the
/// user → roles → permissions walk is the same one the SQL backend runs.
#[derive(Debug)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
    hasher: CredentialHasher,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::with_hasher(CredentialHasher::new())
    }

    /// Hash seeded credentials with `hasher`. Cost parameters travel inside
    /// the PHC string, so any Argon2id verifier accepts the result.
    pub fn with_hasher(hasher: CredentialHasher) -> Self {
        Self {
            state: RwLock::new(DirectoryState::default()),
            hasher,
        }
    }

    /// Create an account with a freshly hashed credential.
    pub fn add_user(&self, username: &str, email: &str, password: &str) -> Result<UserId, SeedError> {
        let input = NewUser::parse(username, email)?;
        let credential = self.hasher.hash(password)?;

        let mut state = self.write()?;
        if state.users.values().any(|u| u.username == input.username) {
            return Err(SeedError::duplicate("user", input.username));
        }

        let user = input.into_user(credential);
        let id = user.id;
        state.users.insert(id, user);
        Ok(id)
    }

    pub fn add_role(&self, role: Role) -> Result<RoleId, SeedError> {
        let mut state = self.write()?;
        if state.roles.values().any(|r| r.name == role.name) {
            return Err(SeedError::duplicate("role", role.name));
        }
        let id = role.id;
        state.roles.insert(id, role);
        Ok(id)
    }

    pub fn add_permission(&self, permission: Permission) -> Result<PermissionId, SeedError> {
        let mut state = self.write()?;
        if state.permissions.values().any(|p| p.token == permission.token) {
            return Err(SeedError::duplicate("permission", permission.token.as_str()));
        }
        let id = permission.id;
        state.permissions.insert(id, permission);
        Ok(id)
    }

    /// Link a user to a role. Re-assigning is a no-op.
    pub fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), SeedError> {
        let mut state = self.write()?;
        if !state.users.contains_key(&user_id) {
            return Err(SeedError::UnknownUser(user_id));
        }
        if !state.roles.contains_key(&role_id) {
            return Err(SeedError::UnknownRole(role_id));
        }
        state.user_roles.insert((user_id, role_id));
        Ok(())
    }

    pub fn revoke_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool, SeedError> {
        Ok(self.write()?.user_roles.remove(&(user_id, role_id)))
    }

    /// Link a permission to a role. Re-granting is a no-op.
    pub fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<(), SeedError> {
        let mut state = self.write()?;
        if !state.roles.contains_key(&role_id) {
            return Err(SeedError::UnknownRole(role_id));
        }
        if !state.permissions.contains_key(&permission_id) {
            return Err(SeedError::UnknownPermission(permission_id));
        }
        state.role_permissions.insert((role_id, permission_id));
        Ok(())
    }

    /// Grant `token` to a role, creating the permission row on first use.
    pub fn grant_token(&self, role_id: RoleId, token: PermissionToken) -> Result<PermissionId, SeedError> {
        let existing = self
            .read()?
            .permissions
            .values()
            .find(|p| p.token == token)
            .map(|p| p.id);
        let permission_id = match existing {
            Some(id) => id,
            None => self.add_permission(Permission::new(token))?,
        };
        self.grant_permission(role_id, permission_id)?;
        Ok(permission_id)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DirectoryState>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DirectoryState>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for InMemoryDirectory {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.values().find(|u| u.username == username).cloned())
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }
}

impl PermissionStore for InMemoryDirectory {
    fn list_permission_tokens(&self, user_id: UserId) -> Result<HashSet<PermissionToken>, StoreError> {
        let state = self.read()?;
        let roles: HashSet<RoleId> = state
            .user_roles
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, r)| *r)
            .collect();

        Ok(state
            .role_permissions
            .iter()
            .filter(|(r, _)| roles.contains(r))
            .filter_map(|(_, p)| state.permissions.get(p))
            .map(|p| p.token.clone())
            .collect())
    }
}

impl RoleStore for InMemoryDirectory {
    fn list_roles(&self, user_id: UserId) -> Result<Vec<Role>, StoreError> {
        let state = self.read()?;
        Ok(state
            .user_roles
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, r)| state.roles.get(r))
            .cloned()
            .collect())
    }
}
