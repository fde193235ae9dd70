//! Completion outcome types handed from the orchestrator to the dispatch layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final classification of one user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// The run completed.
    Ok,
    /// The run ended remotely without a usable classification.
    Failed,
    /// The conversation exceeded the model's context window.
    TooLong,
    /// The remote API rejected the request as invalid.
    InvalidRequest,
    /// Anything else: transport errors, deadlines, unexpected API errors.
    OtherError,
    ModerationFlagged,
    ModerationBlocked,
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionStatus::Ok => write!(f, "ok"),
            CompletionStatus::Failed => write!(f, "failed"),
            CompletionStatus::TooLong => write!(f, "too_long"),
            CompletionStatus::InvalidRequest => write!(f, "invalid_request"),
            CompletionStatus::OtherError => write!(f, "other_error"),
            CompletionStatus::ModerationFlagged => write!(f, "moderation_flagged"),
            CompletionStatus::ModerationBlocked => write!(f, "moderation_blocked"),
        }
    }
}

/// Result of one turn.
///
/// `reply_text` is present only for a non-empty reply with status
/// [`CompletionStatus::Ok`] or [`CompletionStatus::ModerationFlagged`]. The
/// constructors are the only way to build one outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    status: CompletionStatus,
    reply_text: Option<String>,
    status_text: Option<String>,
}

impl CompletionOutcome {
    /// A completed run. Empty replies are stored as `None`.
    pub fn completed(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self {
            status: CompletionStatus::Ok,
            reply_text: if reply.is_empty() { None } else { Some(reply) },
            status_text: None,
        }
    }

    /// A completed run with no reply at all.
    pub fn empty() -> Self {
        Self {
            status: CompletionStatus::Ok,
            reply_text: None,
            status_text: None,
        }
    }

    /// A non-reply outcome carrying a diagnostic.
    ///
    /// Passing [`CompletionStatus::Ok`] yields an empty completion.
    pub fn failure(status: CompletionStatus, status_text: impl Into<String>) -> Self {
        if status == CompletionStatus::Ok {
            return Self::empty();
        }
        Self {
            status,
            reply_text: None,
            status_text: Some(status_text.into()),
        }
    }

    /// A reply suppressed by moderation. Nothing of it is kept.
    pub fn moderation_blocked(status_text: impl Into<String>) -> Self {
        Self::failure(CompletionStatus::ModerationBlocked, status_text)
    }

    /// Mark a reply as flagged by moderation; the reply is still sent.
    ///
    /// Outcomes without a reply are returned unchanged.
    pub fn into_flagged(self) -> Self {
        if self.reply_text.is_none() {
            return self;
        }
        Self {
            status: CompletionStatus::ModerationFlagged,
            ..self
        }
    }

    pub fn status(&self) -> CompletionStatus {
        self.status
    }

    pub fn reply_text(&self) -> Option<&str> {
        self.reply_text.as_deref()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    pub fn into_reply_text(self) -> Option<String> {
        self.reply_text
    }

    /// Whether this outcome asks the caller to close the conversation.
    pub fn closes_conversation(&self) -> bool {
        self.status == CompletionStatus::TooLong
    }
}
