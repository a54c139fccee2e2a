//! Document domain module.
//!
//! Document rows plus the access service that wraps every read and write in
//! a permission check and, where relevant, an ownership check. No IO of its
//! own: storage comes in through [`DocumentStore`].

pub mod document;
pub mod service;
pub mod store;
pub mod tokens;

pub use document::{Document, DocumentStatus};
pub use service::{DocumentAccessService, DocumentCapabilities, DocumentError};
pub use store::DocumentStore;
