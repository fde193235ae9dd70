//! Chat platform message types.
//!
//! The chat platform is an external collaborator. These types are the data
//! that crosses its boundary: inbound user messages, the "most recent
//! message" answer used for staleness checks, and what the bot sends back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::ConversationId;

/// A message posted into a conversation, as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform message id, unique within the conversation.
    pub id: String,
    pub conversation_id: ConversationId,
    /// Server (guild) the conversation lives in, when the platform has one.
    #[serde(default)]
    pub server_id: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub is_from_bot: bool,
}

impl InboundMessage {
    /// Reduce to the fields used for ordering comparisons.
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            id: self.id.clone(),
            author_id: self.author_id.clone(),
            timestamp: self.timestamp,
            is_from_bot: self.is_from_bot,
        }
    }
}

/// Identity and ordering data of a message, without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
    pub author_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_from_bot: bool,
}

/// Platform-side state of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub archived: bool,
    pub locked: bool,
    /// Messages posted so far, by anyone.
    pub message_count: u32,
}

impl ConversationState {
    /// Whether the bot should still answer in this conversation.
    pub fn is_open(&self) -> bool {
        !self.archived && !self.locked
    }
}

/// One bounded-length piece of a reply, 1-indexed in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub text: String,
}

/// Severity of a notice, used by the platform to pick its rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// Something the bot posts into a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Plain reply text.
    Segment(Segment),
    /// A status line rendered distinctly from replies (embeds on Discord).
    Notice { level: NoticeLevel, text: String },
}

impl OutboundMessage {
    pub fn notice(level: NoticeLevel, text: impl Into<String>) -> Self {
        OutboundMessage::Notice {
            level,
            text: text.into(),
        }
    }
}
