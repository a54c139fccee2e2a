use std::borrow::{Borrow, Cow};

use serde::{Deserialize, Serialize};

use docmgmt_core::{DomainError, Entity, PermissionId, ValueObject};

/// Permission token.
///
/// Tokens are opaque strings of the form `resource:action[:scope]`
/// (e.g. `"document:edit:own"`). Matching is exact string equality: there is
/// no wildcard and no implication between tokens (`document:edit:all` does
/// not grant `document:edit:own`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionToken(Cow<'static, str>);

impl PermissionToken {
    /// Wrap a token without validation (store rows are taken as-is).
    pub fn new(token: impl Into<Cow<'static, str>>) -> Self {
        Self(token.into())
    }

    pub const fn from_static(token: &'static str) -> Self {
        Self(Cow::Borrowed(token))
    }

    /// Validate and wrap a token: non-empty, no whitespace, at least
    /// `resource:action`, at most `resource:action:scope`.
    pub fn parse(token: &str) -> Result<Self, DomainError> {
        if token.is_empty() {
            return Err(DomainError::validation("permission token cannot be empty"));
        }
        if token.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(format!(
                "permission token '{token}' contains whitespace"
            )));
        }

        let parts: Vec<&str> = token.split(':').collect();
        if !(2..=3).contains(&parts.len()) || parts.iter().any(|p| p.is_empty()) {
            return Err(DomainError::validation(format!(
                "permission token '{token}' is not of the form resource:action[:scope]"
            )));
        }

        Ok(Self(Cow::Owned(token.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resource(&self) -> &str {
        self.segment(0).unwrap_or_else(|| self.as_str())
    }

    pub fn action(&self) -> Option<&str> {
        self.segment(1)
    }

    pub fn scope(&self) -> Option<&str> {
        self.segment(2)
    }

    fn segment(&self, index: usize) -> Option<&str> {
        self.as_str().split(':').nth(index)
    }
}

impl ValueObject for PermissionToken {}

impl AsRef<str> for PermissionToken {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// Lets a `HashSet<PermissionToken>` be probed with a plain `&str`.
impl Borrow<str> for PermissionToken {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl core::fmt::Display for PermissionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored permission row (token plus optional human description).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub token: PermissionToken,
    pub description: Option<String>,
}

impl Permission {
    pub fn new(token: PermissionToken) -> Self {
        Self {
            id: PermissionId::new(),
            token,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Entity for Permission {
    type Id = PermissionId;

    fn id(&self) -> PermissionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn splits_into_resource_action_scope() {
        let token = PermissionToken::parse("document:edit:own").unwrap();
        assert_eq!(token.resource(), "document");
        assert_eq!(token.action(), Some("edit"));
        assert_eq!(token.scope(), Some("own"));

        let token = PermissionToken::parse("document:create").unwrap();
        assert_eq!(token.scope(), None);
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        for bad in ["", "document", "document:", ":edit", "document:edit:own:extra", "document: edit"] {
            assert!(PermissionToken::parse(bad).is_err(), "accepted '{bad}'");
        }
    }

    #[test]
    fn static_and_owned_tokens_are_interchangeable() {
        let mut set = HashSet::new();
        set.insert(PermissionToken::new("document:create".to_string()));

        assert!(set.contains(&PermissionToken::from_static("document:create")));
        assert!(set.contains("document:create"));
        assert!(!set.contains("document:create:own"));
    }
}
