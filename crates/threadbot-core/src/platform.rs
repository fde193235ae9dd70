//! ChatPlatform trait definition.

use threadbot_types::error::PlatformError;
use threadbot_types::platform::{ConversationState, MessageRef, OutboundMessage};
use threadbot_types::session::ConversationId;

/// Port to the chat platform hosting the conversations.
///
/// Inbound messages are pushed by the platform adapter into the
/// conversation service; this trait covers the calls going the other way.
pub trait ChatPlatform: Send + Sync {
    /// Open a new conversation (a thread) and return its id.
    fn open_conversation(
        &self,
        title: &str,
    ) -> impl std::future::Future<Output = Result<ConversationId, PlatformError>> + Send;

    /// The most recent message in the conversation, if any.
    fn latest_message(
        &self,
        conversation: &ConversationId,
    ) -> impl std::future::Future<Output = Result<Option<MessageRef>, PlatformError>> + Send;

    /// Archived/locked flags and message count.
    fn conversation_state(
        &self,
        conversation: &ConversationId,
    ) -> impl std::future::Future<Output = Result<ConversationState, PlatformError>> + Send;

    /// Post a reply segment or a notice.
    fn send(
        &self,
        conversation: &ConversationId,
        message: OutboundMessage,
    ) -> impl std::future::Future<Output = Result<(), PlatformError>> + Send;

    /// Close the conversation so it accepts no further messages.
    fn close_conversation(
        &self,
        conversation: &ConversationId,
    ) -> impl std::future::Future<Output = Result<(), PlatformError>> + Send;
}
