//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. A permission
/// token or a document status is one: two tokens spelling the same string are
/// the same grant.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (`PermissionToken("document:create")`)
/// - **Entity**: has identity (`Document { id: DocumentId(...), .. }`)
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
