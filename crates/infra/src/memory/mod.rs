//! In-memory collaborator implementations for tests and demos.

mod directory;
mod documents;

pub use directory::InMemoryDirectory;
pub use documents::InMemoryDocumentStore;
