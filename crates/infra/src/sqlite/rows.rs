//! Row → domain mapping and sqlx error classification.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use docmgmt_auth::{Credential, PermissionToken, Role, StoreError, User};
use docmgmt_documents::{Document, DocumentStatus};

pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    let mapped = match &err {
        sqlx::Error::Configuration(_)
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        sqlx::Error::ColumnNotFound(_) | sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    };
    tracing::error!(error = %err, "sqlite operation failed");
    mapped
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(store_error)
}

fn parse_id<T>(row: &SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: FromStr<Err = docmgmt_core::DomainError>,
{
    let raw: String = column(row, name)?;
    raw.parse().map_err(|e| StoreError::Corrupt(format!("{name}: {e}")))
}

/// Fixed-width RFC 3339 (nanoseconds, `Z`), so TEXT order is time order.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(row: &SqliteRow, name: &str) -> Result<DateTime<Utc>, StoreError> {
    let raw: String = column(row, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("{name}: {e}")))
}

pub(crate) fn user(row: &SqliteRow) -> Result<User, StoreError> {
    Ok(User {
        id: parse_id(row, "id")?,
        username: column(row, "username")?,
        email: column(row, "email")?,
        credential: Credential::from_phc(column::<String>(row, "password_hash")?),
        created_at: parse_timestamp(row, "created_at")?,
    })
}

pub(crate) fn role(row: &SqliteRow) -> Result<Role, StoreError> {
    Ok(Role {
        id: parse_id(row, "id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
    })
}

pub(crate) fn token(row: &SqliteRow) -> Result<PermissionToken, StoreError> {
    // Opaque, matched by equality: read back exactly what was granted.
    column::<String>(row, "permission_name").map(PermissionToken::new)
}

pub(crate) fn document(row: &SqliteRow) -> Result<Document, StoreError> {
    let status: String = column(row, "status")?;
    Ok(Document {
        id: parse_id(row, "id")?,
        title: column(row, "title")?,
        content: column(row, "content")?,
        owner_id: parse_id(row, "owner_user_id")?,
        status: DocumentStatus::new(status),
        created_at: parse_timestamp(row, "created_at")?,
        updated_at: parse_timestamp(row, "updated_at")?,
    })
}
