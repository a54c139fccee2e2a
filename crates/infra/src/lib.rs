//! Infrastructure layer: collaborator-trait backends and store configuration.

pub mod config;
pub mod memory;
pub mod seed;
pub mod sqlite;

pub use config::StoreConfig;
pub use memory::{InMemoryDirectory, InMemoryDocumentStore};
pub use seed::SeedError;
pub use sqlite::SqliteStore;
