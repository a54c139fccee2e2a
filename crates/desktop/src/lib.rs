//! `docmgmt-desktop`
//!
//! **Responsibility:** the presentation-facing side of the document client.
//!
//! This crate provides:
//! - [`DesktopClient`], one call per user action
//! - Capability flags for enabling/disabling UI controls
//! - Change notifications for refreshing views
//!
//! Window composition and data binding live in the UI toolkit, not here.

pub mod client;
pub mod config;
pub mod types;

pub use client::{DesktopClient, SqliteClient};
pub use config::ClientConfig;
pub use types::{Capabilities, DocumentCapabilities, USER_MANAGE, UserView};
