use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docmgmt_core::{DocumentId, UserId};

/// Which document mutation triggered a [`ClientNotification::DocumentsChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentChange {
    Created,
    Updated,
    Deleted,
}

/// State changes announced to the presentation layer.
///
/// Notifications are facts about operations that already succeeded. Refused
/// or failed operations never publish anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientNotification {
    /// A user authenticated (`user_id = Some`) or the session ended (`None`).
    SessionChanged {
        user_id: Option<UserId>,
        occurred_at: DateTime<Utc>,
    },

    /// The visible document list is stale and should be refreshed.
    DocumentsChanged {
        change: DocumentChange,
        document_id: DocumentId,
        occurred_at: DateTime<Utc>,
    },
}

impl ClientNotification {
    pub fn session_started(user_id: UserId) -> Self {
        Self::SessionChanged {
            user_id: Some(user_id),
            occurred_at: Utc::now(),
        }
    }

    pub fn session_ended() -> Self {
        Self::SessionChanged {
            user_id: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn documents_changed(change: DocumentChange, document_id: DocumentId) -> Self {
        Self::DocumentsChanged {
            change,
            document_id,
            occurred_at: Utc::now(),
        }
    }

    /// Stable topic name (e.g. "session.changed"), handy for log fields.
    pub fn topic(&self) -> &'static str {
        match self {
            ClientNotification::SessionChanged { .. } => "session.changed",
            ClientNotification::DocumentsChanged { .. } => "documents.changed",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ClientNotification::SessionChanged { occurred_at, .. }
            | ClientNotification::DocumentsChanged { occurred_at, .. } => *occurred_at,
        }
    }
}
