//! SQLite-backed implementation of every collaborator trait.
//!
//! The collaborator traits are synchronous; the store owns a private
//! current-thread tokio runtime and blocks on each query. Do not call it from
//! inside another tokio runtime.

mod rows;
mod schema;

use std::collections::HashSet;
use std::str::FromStr;

use anyhow::Context;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::runtime::{Builder, Runtime};

use docmgmt_auth::{
    CredentialHasher, NewUser, Permission, PermissionStore, PermissionToken, Role, RoleStore, StoreError, User,
    UserStore,
};
use docmgmt_core::{DocumentId, PermissionId, RoleId, UserId};
use docmgmt_documents::{Document, DocumentStore};

use crate::config::StoreConfig;
use crate::seed::SeedError;

use rows::store_error;

#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    runtime: Runtime,
    hasher: CredentialHasher,
}

impl SqliteStore {
    /// Open (creating if missing) the database named by `config` and run
    /// [`migrate`](Self::migrate).
    pub fn open(config: &StoreConfig) -> anyhow::Result<Self> {
        let path = config.database_path();
        if path.is_none() && config.database_url.contains(":memory:") {
            return Self::in_memory().context("failed to open in-memory SQLite database");
        }
        if let Some(parent) = path.as_deref().and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create database directory at {parent:?}"))?;
            }
        }

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("invalid SQLite URL '{}'", config.database_url))?
            .create_if_missing(true);

        let runtime = runtime().context("failed to build SQLite runtime")?;
        let pool = runtime
            .block_on(SqlitePoolOptions::new().connect_with(options))
            .with_context(|| format!("failed to open SQLite database at '{}'", config.database_url))?;

        let store = Self::from_parts(pool, runtime);
        store.migrate().context("failed to migrate SQLite schema")?;
        tracing::info!(database_url = %config.database_url, "sqlite store ready");
        Ok(store)
    }

    /// Private in-memory database, migrated. Lives as long as the store.
    pub fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(store_error)?;
        let runtime = runtime().map_err(|e| StoreError::Unavailable(e.to_string()))?;

        // The database lives only while a connection holds it open.
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options),
            )
            .map_err(store_error)?;

        let store = Self::from_parts(pool, runtime);
        store.migrate()?;
        Ok(store)
    }

    fn from_parts(pool: SqlitePool, runtime: Runtime) -> Self {
        Self {
            pool,
            runtime,
            hasher: CredentialHasher::new(),
        }
    }

    /// Hash seeded credentials with `hasher` instead of the default cost.
    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Create missing tables. Idempotent.
    pub fn migrate(&self) -> Result<(), StoreError> {
        self.runtime.block_on(async {
            for &(name, ddl) in schema::MIGRATIONS {
                sqlx::query(ddl).execute(&self.pool).await.map_err(store_error)?;
                tracing::debug!(table = name, "migration applied");
            }
            Ok::<(), StoreError>(())
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ── provisioning ────────────────────────────────────────────────────────

    pub fn add_user(&self, username: &str, email: &str, password: &str) -> Result<UserId, SeedError> {
        let input = NewUser::parse(username, email)?;
        let credential = self.hasher.hash(password)?;
        let user = input.into_user(credential);

        self.runtime
            .block_on(
                sqlx::query(
                    "INSERT INTO users (id, username, password_hash, email, created_at) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(user.id.to_string())
                .bind(&user.username)
                .bind(user.credential.as_phc())
                .bind(&user.email)
                .bind(rows::timestamp(user.created_at))
                .execute(&self.pool),
            )
            .map_err(|e| seed_error(e, "user", &user.username))?;
        Ok(user.id)
    }

    pub fn add_role(&self, role: Role) -> Result<RoleId, SeedError> {
        self.runtime
            .block_on(
                sqlx::query("INSERT INTO roles (id, name, description) VALUES (?, ?, ?)")
                    .bind(role.id.to_string())
                    .bind(&role.name)
                    .bind(role.description.as_deref())
                    .execute(&self.pool),
            )
            .map_err(|e| seed_error(e, "role", &role.name))?;
        Ok(role.id)
    }

    pub fn add_permission(&self, permission: Permission) -> Result<PermissionId, SeedError> {
        self.runtime
            .block_on(
                sqlx::query("INSERT INTO permissions (id, permission_name, description) VALUES (?, ?, ?)")
                    .bind(permission.id.to_string())
                    .bind(permission.token.as_str())
                    .bind(permission.description.as_deref())
                    .execute(&self.pool),
            )
            .map_err(|e| seed_error(e, "permission", permission.token.as_str()))?;
        Ok(permission.id)
    }

    /// Link a user to a role. Re-assigning is a no-op.
    pub fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), SeedError> {
        if !self.exists("users", &user_id.to_string())? {
            return Err(SeedError::UnknownUser(user_id));
        }
        if !self.exists("roles", &role_id.to_string())? {
            return Err(SeedError::UnknownRole(role_id));
        }
        self.runtime
            .block_on(
                sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
                    .bind(user_id.to_string())
                    .bind(role_id.to_string())
                    .execute(&self.pool),
            )
            .map_err(store_error)?;
        Ok(())
    }

    pub fn revoke_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool, SeedError> {
        let result = self
            .runtime
            .block_on(
                sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ?")
                    .bind(user_id.to_string())
                    .bind(role_id.to_string())
                    .execute(&self.pool),
            )
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// Link a permission to a role. Re-granting is a no-op.
    pub fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<(), SeedError> {
        if !self.exists("roles", &role_id.to_string())? {
            return Err(SeedError::UnknownRole(role_id));
        }
        if !self.exists("permissions", &permission_id.to_string())? {
            return Err(SeedError::UnknownPermission(permission_id));
        }
        self.runtime
            .block_on(
                sqlx::query("INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
                    .bind(role_id.to_string())
                    .bind(permission_id.to_string())
                    .execute(&self.pool),
            )
            .map_err(store_error)?;
        Ok(())
    }

    /// Grant `token` to a role, creating the permission row on first use.
    pub fn grant_token(&self, role_id: RoleId, token: PermissionToken) -> Result<PermissionId, SeedError> {
        let existing: Option<String> = self
            .runtime
            .block_on(
                sqlx::query_scalar("SELECT id FROM permissions WHERE permission_name = ?")
                    .bind(token.as_str())
                    .fetch_optional(&self.pool),
            )
            .map_err(store_error)?;

        let permission_id = match existing {
            Some(raw) => raw
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("permissions.id: {e}")))?,
            None => self.add_permission(Permission::new(token))?,
        };
        self.grant_permission(role_id, permission_id)?;
        Ok(permission_id)
    }

    fn exists(&self, table: &'static str, id: &str) -> Result<bool, StoreError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
        let found: i64 = self
            .runtime
            .block_on(sqlx::query_scalar(&sql).bind(id).fetch_one(&self.pool))
            .map_err(store_error)?;
        Ok(found != 0)
    }
}

fn runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

fn seed_error(err: sqlx::Error, kind: &'static str, name: &str) -> SeedError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return SeedError::duplicate(kind, name);
        }
    }
    SeedError::Storage(store_error(err))
}

impl UserStore for SqliteStore {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = self
            .runtime
            .block_on(
                sqlx::query("SELECT * FROM users WHERE username = ?")
                    .bind(username)
                    .fetch_optional(&self.pool),
            )
            .map_err(store_error)?;
        row.as_ref().map(rows::user).transpose()
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = self
            .runtime
            .block_on(
                sqlx::query("SELECT * FROM users WHERE id = ?")
                    .bind(id.to_string())
                    .fetch_optional(&self.pool),
            )
            .map_err(store_error)?;
        row.as_ref().map(rows::user).transpose()
    }
}

impl PermissionStore for SqliteStore {
    fn list_permission_tokens(&self, user_id: UserId) -> Result<HashSet<PermissionToken>, StoreError> {
        let records = self
            .runtime
            .block_on(
                sqlx::query(
                    r#"
                    SELECT DISTINCT p.permission_name
                    FROM permissions p
                    JOIN role_permissions rp ON rp.permission_id = p.id
                    JOIN user_roles ur ON ur.role_id = rp.role_id
                    WHERE ur.user_id = ?
                    "#,
                )
                .bind(user_id.to_string())
                .fetch_all(&self.pool),
            )
            .map_err(store_error)?;
        records.iter().map(rows::token).collect()
    }
}

impl RoleStore for SqliteStore {
    fn list_roles(&self, user_id: UserId) -> Result<Vec<Role>, StoreError> {
        let records = self
            .runtime
            .block_on(
                sqlx::query(
                    r#"
                    SELECT r.*
                    FROM roles r
                    JOIN user_roles ur ON ur.role_id = r.id
                    WHERE ur.user_id = ?
                    "#,
                )
                .bind(user_id.to_string())
                .fetch_all(&self.pool),
            )
            .map_err(store_error)?;
        records.iter().map(rows::role).collect()
    }
}

impl DocumentStore for SqliteStore {
    fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        let records = self
            .runtime
            .block_on(
                sqlx::query("SELECT * FROM documents ORDER BY created_at DESC, id DESC").fetch_all(&self.pool),
            )
            .map_err(store_error)?;
        records.iter().map(rows::document).collect()
    }

    fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Document>, StoreError> {
        let records = self
            .runtime
            .block_on(
                sqlx::query("SELECT * FROM documents WHERE owner_user_id = ? ORDER BY created_at DESC, id DESC")
                    .bind(owner_id.to_string())
                    .fetch_all(&self.pool),
            )
            .map_err(store_error)?;
        records.iter().map(rows::document).collect()
    }

    fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        let row = self
            .runtime
            .block_on(
                sqlx::query("SELECT * FROM documents WHERE id = ?")
                    .bind(id.to_string())
                    .fetch_optional(&self.pool),
            )
            .map_err(store_error)?;
        row.as_ref().map(rows::document).transpose()
    }

    fn insert(&self, document: &Document) -> Result<(), StoreError> {
        self.runtime
            .block_on(
                sqlx::query(
                    r#"
                    INSERT INTO documents (id, title, content, owner_user_id, status, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(document.id.to_string())
                .bind(&document.title)
                .bind(&document.content)
                .bind(document.owner_id.to_string())
                .bind(document.status.as_str())
                .bind(rows::timestamp(document.created_at))
                .bind(rows::timestamp(document.updated_at))
                .execute(&self.pool),
            )
            .map_err(store_error)?;
        Ok(())
    }

    fn update(&self, document: &Document) -> Result<bool, StoreError> {
        let result = self
            .runtime
            .block_on(
                sqlx::query("UPDATE documents SET title = ?, content = ?, status = ?, updated_at = ? WHERE id = ?")
                    .bind(&document.title)
                    .bind(&document.content)
                    .bind(document.status.as_str())
                    .bind(rows::timestamp(document.updated_at))
                    .bind(document.id.to_string())
                    .execute(&self.pool),
            )
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    fn delete(&self, id: DocumentId) -> Result<bool, StoreError> {
        let result = self
            .runtime
            .block_on(
                sqlx::query("DELETE FROM documents WHERE id = ?")
                    .bind(id.to_string())
                    .execute(&self.pool),
            )
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }
}
