use serde::Serialize;
use thiserror::Error;

use docmgmt_core::UserId;

use crate::{Role, Session};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Stateless policy predicate over the active session.
///
/// This is the sole policy surface: every authorization decision reduces to
/// one or more `has_permission` calls, optionally combined with an ownership
/// test done by the caller.
///
/// - No IO
/// - No panics
/// - No role shortcuts, no wildcard, no implication between tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessController;

impl AccessController {
    /// `false` without a session; otherwise exact membership in the snapshot.
    pub fn has_permission(session: Option<&Session>, token: impl AsRef<str>) -> bool {
        session.is_some_and(|s| s.has_permission(token.as_ref()))
    }

    /// Like [`has_permission`](Self::has_permission) but says why a request
    /// was refused.
    pub fn require(session: Option<&Session>, token: impl AsRef<str>) -> Result<(), AuthzError> {
        let token = token.as_ref();
        let session = session.ok_or(AuthzError::Unauthenticated)?;
        if session.has_permission(token) {
            Ok(())
        } else {
            tracing::debug!(user_id = %session.user_id(), token, "permission denied");
            Err(AuthzError::Forbidden(token.to_string()))
        }
    }

    /// Explain why a check would be granted or denied.
    ///
    /// `roles` are the roles behind the session's snapshot (display only: the
    /// decision itself never looks at them).
    pub fn explain(session: Option<&Session>, token: impl AsRef<str>, roles: &[Role]) -> AuthorizationExplanation {
        let required = token.as_ref();

        let Some(session) = session else {
            return AuthorizationExplanation {
                required_permission: required.to_string(),
                granted: false,
                reason: "No active session: unauthenticated callers hold no permissions".to_string(),
                principal: None,
                denial_reason: Some(DenialReason {
                    kind: DenialKind::Unauthenticated,
                    message: "Authentication required".to_string(),
                    suggestions: vec!["Log in with an account that holds the required permission".to_string()],
                }),
            };
        };

        let mut effective: Vec<String> = session.permissions().iter().map(|p| p.as_str().to_string()).collect();
        effective.sort();

        let principal = PrincipalState {
            user_id: session.user_id(),
            username: session.user().username.clone(),
            roles: roles.iter().map(|r| r.name.clone()).collect(),
            effective_permissions: effective.clone(),
        };

        if session.has_permission(required) {
            return AuthorizationExplanation {
                required_permission: required.to_string(),
                granted: true,
                reason: format!("Session holds permission '{required}'"),
                principal: Some(principal),
                denial_reason: None,
            };
        }

        let mut suggestions = vec![format!("Assign a role that grants the '{required}' permission")];

        // Same resource:action under another scope is a common confusion
        // (e.g. holding `document:edit:all` while `document:edit:own` is checked).
        let stem = stem_of(required);
        let near_misses: Vec<&String> = effective.iter().filter(|p| stem_of(p) == stem).collect();
        if !near_misses.is_empty() {
            suggestions.push(format!(
                "Held tokens {near_misses:?} share the '{stem}' prefix but tokens never imply each other"
            ));
        }
        if !roles.is_empty() {
            suggestions.push("Permission changes take effect at the next login".to_string());
        }

        AuthorizationExplanation {
            required_permission: required.to_string(),
            granted: false,
            reason: format!("Session does not hold permission '{required}'. Current permissions: {effective:?}"),
            principal: Some(principal),
            denial_reason: Some(DenialReason {
                kind: DenialKind::MissingPermission,
                message: format!("Missing required permission: '{required}'"),
                suggestions,
            }),
        }
    }
}

fn stem_of(token: &str) -> &str {
    match token.match_indices(':').nth(1) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    /// The permission that was being checked.
    pub required_permission: String,

    /// Whether the check passes.
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// The session's identity and snapshot; `None` when unauthenticated.
    pub principal: Option<PrincipalState>,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub user_id: UserId,
    pub username: String,
    pub roles: Vec<String>,
    pub effective_permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthenticated,
    MissingPermission,
}
