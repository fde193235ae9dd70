//! Remote run and message types.
//!
//! These model the data returned by the remote assistant API: run status
//! snapshots, the error a failed run reports, and session messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a run as reported by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteRunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl RemoteRunStatus {
    /// Whether the remote run will not change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RemoteRunStatus::Cancelled
                | RemoteRunStatus::Failed
                | RemoteRunStatus::Completed
                | RemoteRunStatus::Incomplete
                | RemoteRunStatus::Expired
        )
    }
}

impl fmt::Display for RemoteRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteRunStatus::Queued => write!(f, "queued"),
            RemoteRunStatus::InProgress => write!(f, "in_progress"),
            RemoteRunStatus::RequiresAction => write!(f, "requires_action"),
            RemoteRunStatus::Cancelling => write!(f, "cancelling"),
            RemoteRunStatus::Cancelled => write!(f, "cancelled"),
            RemoteRunStatus::Failed => write!(f, "failed"),
            RemoteRunStatus::Completed => write!(f, "completed"),
            RemoteRunStatus::Incomplete => write!(f, "incomplete"),
            RemoteRunStatus::Expired => write!(f, "expired"),
        }
    }
}

impl FromStr for RemoteRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(RemoteRunStatus::Queued),
            "in_progress" => Ok(RemoteRunStatus::InProgress),
            "requires_action" => Ok(RemoteRunStatus::RequiresAction),
            "cancelling" => Ok(RemoteRunStatus::Cancelling),
            "cancelled" => Ok(RemoteRunStatus::Cancelled),
            "failed" => Ok(RemoteRunStatus::Failed),
            "completed" => Ok(RemoteRunStatus::Completed),
            "incomplete" => Ok(RemoteRunStatus::Incomplete),
            "expired" => Ok(RemoteRunStatus::Expired),
            other => Err(format!("invalid run status: '{other}'")),
        }
    }
}

/// Error details attached to a run that ended badly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLastError {
    /// Machine-readable code (e.g., "server_error", "invalid_prompt").
    pub code: String,
    pub message: String,
}

/// One observation of a remote run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub id: String,
    pub status: RemoteRunStatus,
    #[serde(default)]
    pub last_error: Option<RunLastError>,
}

/// Author role of a message in a remote session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Ordering for message listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    Asc,
    Desc,
}

impl fmt::Display for ListOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListOrder::Asc => write!(f, "asc"),
            ListOrder::Desc => write!(f, "desc"),
        }
    }
}

/// A message stored in a remote session, reduced to its text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMessage {
    pub role: MessageRole,
    pub text: String,
}
