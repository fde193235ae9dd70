//! Terminal-backed chat platform.
//!
//! Conversations live in memory for the lifetime of the process. Replies and
//! notices are written to the terminal through a shared writer so they do
//! not clobber the readline prompt.

use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;
use console::style;
use dashmap::DashMap;
use uuid::Uuid;

use threadbot_core::platform::ChatPlatform;
use threadbot_types::error::PlatformError;
use threadbot_types::platform::{
    ConversationState, InboundMessage, MessageRef, NoticeLevel, OutboundMessage,
};
use threadbot_types::session::ConversationId;

const BOT_AUTHOR_ID: &str = "threadbot";

#[derive(Debug, Clone)]
struct ConversationLog {
    title: String,
    closed: bool,
    message_count: u32,
    latest: Option<MessageRef>,
}

pub struct ConsolePlatform {
    conversations: DashMap<ConversationId, ConversationLog>,
    user_id: String,
    /// The user's first line, posted into the next conversation opened.
    opening: Mutex<Option<String>>,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsolePlatform {
    pub fn new(writer: impl Write + Send + 'static, user_id: impl Into<String>) -> Self {
        Self {
            conversations: DashMap::new(),
            user_id: user_id.into(),
            opening: Mutex::new(None),
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Stage the message a conversation is opened from.
    ///
    /// Chat platforms open a thread from the user's message, so that message
    /// is the first one in the conversation and counts towards its limit.
    pub fn stage_opening_message(&self, text: &str) {
        *self
            .opening
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(text.to_string());
    }

    /// Record a line typed by the user and turn it into an inbound message.
    pub fn record_user_message(
        &self,
        conversation: &ConversationId,
        author_name: &str,
        text: &str,
    ) -> Result<InboundMessage, PlatformError> {
        let message = InboundMessage {
            id: Uuid::now_v7().to_string(),
            conversation_id: conversation.clone(),
            server_id: None,
            author_id: self.user_id.clone(),
            author_name: author_name.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
            is_from_bot: false,
        };
        self.record(conversation, message.message_ref())?;
        Ok(message)
    }

    pub fn title(&self, conversation: &ConversationId) -> Option<String> {
        self.conversations.get(conversation).map(|log| log.title.clone())
    }

    pub fn is_closed(&self, conversation: &ConversationId) -> bool {
        self.conversations
            .get(conversation)
            .is_none_or(|log| log.closed)
    }

    fn record(&self, conversation: &ConversationId, message: MessageRef) -> Result<(), PlatformError> {
        let mut log = self
            .conversations
            .get_mut(conversation)
            .ok_or_else(|| PlatformError::ConversationNotFound(conversation.clone()))?;
        if log.closed {
            return Err(PlatformError::Send(format!("conversation {conversation} is closed")));
        }
        log.message_count += 1;
        log.latest = Some(message);
        Ok(())
    }

    fn write_line(&self, line: &str) -> Result<(), PlatformError> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(writer, "{line}")
            .and_then(|()| writer.flush())
            .map_err(|e| PlatformError::Send(e.to_string()))
    }
}

/// Notices use markdown emphasis on chat platforms; the terminal styles the
/// whole line instead.
fn render(message: &OutboundMessage) -> String {
    match message {
        OutboundMessage::Segment(segment) => format!(
            "  {} {}",
            style("Bot >").cyan().bold(),
            segment.text.replace('\n', "\n        ")
        ),
        OutboundMessage::Notice { level, text } => {
            let text = text.replace("**", "");
            match level {
                NoticeLevel::Info => format!("  {} {}", style("i").cyan().bold(), style(text).dim()),
                NoticeLevel::Warning => {
                    format!("  {} {}", style("!").yellow().bold(), style(text).yellow())
                }
                NoticeLevel::Error => format!("  {} {}", style("✗").red().bold(), style(text).red()),
            }
        }
    }
}

impl ChatPlatform for ConsolePlatform {
    async fn open_conversation(&self, title: &str) -> Result<ConversationId, PlatformError> {
        let id = ConversationId::new(Uuid::now_v7().to_string());
        let opening = self
            .opening
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .map(|_| MessageRef {
                id: Uuid::now_v7().to_string(),
                author_id: self.user_id.clone(),
                timestamp: Utc::now(),
                is_from_bot: false,
            });
        self.conversations.insert(
            id.clone(),
            ConversationLog {
                title: title.to_string(),
                closed: false,
                message_count: u32::from(opening.is_some()),
                latest: opening,
            },
        );
        self.write_line(&format!("\n  {}\n", style(title).bold()))?;
        Ok(id)
    }

    async fn latest_message(
        &self,
        conversation: &ConversationId,
    ) -> Result<Option<MessageRef>, PlatformError> {
        self.conversations
            .get(conversation)
            .map(|log| log.latest.clone())
            .ok_or_else(|| PlatformError::ConversationNotFound(conversation.clone()))
    }

    async fn conversation_state(
        &self,
        conversation: &ConversationId,
    ) -> Result<ConversationState, PlatformError> {
        self.conversations
            .get(conversation)
            .map(|log| ConversationState {
                archived: log.closed,
                locked: false,
                message_count: log.message_count,
            })
            .ok_or_else(|| PlatformError::ConversationNotFound(conversation.clone()))
    }

    async fn send(
        &self,
        conversation: &ConversationId,
        message: OutboundMessage,
    ) -> Result<(), PlatformError> {
        self.record(
            conversation,
            MessageRef {
                id: Uuid::now_v7().to_string(),
                author_id: BOT_AUTHOR_ID.to_string(),
                timestamp: Utc::now(),
                is_from_bot: true,
            },
        )?;
        self.write_line(&render(&message))
    }

    async fn close_conversation(&self, conversation: &ConversationId) -> Result<(), PlatformError> {
        let newly_closed = {
            let mut log = self
                .conversations
                .get_mut(conversation)
                .ok_or_else(|| PlatformError::ConversationNotFound(conversation.clone()))?;
            !std::mem::replace(&mut log.closed, true)
        };
        if newly_closed {
            tracing::debug!(conversation_id = %conversation, "Console conversation closed");
        }
        Ok(())
    }
}
