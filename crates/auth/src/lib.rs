//! `docmgmt-auth`: authentication and authorization core.
//!
//! Resolves permission sets from role assignments, keeps the current session
//! and answers policy questions. Decoupled from storage (collaborator traits
//! in [`store`]) and from presentation.

pub mod authorize;
pub mod credential;
pub mod permissions;
pub mod resolver;
pub mod roles;
pub mod session;
pub mod store;
pub mod user;

pub use authorize::{AccessController, AuthorizationExplanation, AuthzError, DenialKind};
pub use credential::{Credential, CredentialError, CredentialHasher};
pub use permissions::{Permission, PermissionToken};
pub use resolver::PermissionResolver;
pub use roles::Role;
pub use session::{AuthError, Session, SessionManager};
pub use store::{PermissionStore, RoleStore, StoreError, UserStore};
pub use user::{NewUser, User};
