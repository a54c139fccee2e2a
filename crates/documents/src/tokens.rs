//! Permission tokens checked by [`DocumentAccessService`](crate::DocumentAccessService).
//!
//! Only the `…:own` variants of edit/delete exist. Holding a token spelled
//! `document:edit:all` grants nothing here.

use docmgmt_auth::PermissionToken;

/// Full visibility: list and read every document.
pub const DOCUMENT_LIST_ALL: PermissionToken = PermissionToken::from_static("document:list:all");

pub const DOCUMENT_CREATE: PermissionToken = PermissionToken::from_static("document:create");

/// Edit documents the caller owns.
pub const DOCUMENT_EDIT_OWN: PermissionToken = PermissionToken::from_static("document:edit:own");

/// Delete documents the caller owns.
pub const DOCUMENT_DELETE_OWN: PermissionToken = PermissionToken::from_static("document:delete:own");

