//! Relational schema: users, roles and permissions joined through two
//! association tables, plus the document table.
//!
//! Identifiers are stored as TEXT UUIDs; timestamps as RFC 3339 TEXT, which
//! sorts chronologically.

pub(crate) const MIGRATIONS: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            email         TEXT NOT NULL,
            created_at    TEXT NOT NULL
        )
        "#,
    ),
    (
        "roles",
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE,
            description TEXT NULL
        )
        "#,
    ),
    (
        "permissions",
        r#"
        CREATE TABLE IF NOT EXISTS permissions (
            id              TEXT PRIMARY KEY,
            permission_name TEXT NOT NULL UNIQUE,
            description     TEXT NULL
        )
        "#,
    ),
    (
        "user_roles",
        r#"
        CREATE TABLE IF NOT EXISTS user_roles (
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, role_id)
        )
        "#,
    ),
    (
        "role_permissions",
        r#"
        CREATE TABLE IF NOT EXISTS role_permissions (
            role_id       TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            permission_id TEXT NOT NULL REFERENCES permissions(id) ON DELETE CASCADE,
            PRIMARY KEY (role_id, permission_id)
        )
        "#,
    ),
    (
        "documents",
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id            TEXT PRIMARY KEY,
            title         TEXT NOT NULL,
            content       TEXT NOT NULL,
            owner_user_id TEXT NOT NULL REFERENCES users(id),
            status        TEXT NOT NULL,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        )
        "#,
    ),
    (
        "documents_owner_idx",
        "CREATE INDEX IF NOT EXISTS documents_owner_idx ON documents (owner_user_id, created_at)",
    ),
];
