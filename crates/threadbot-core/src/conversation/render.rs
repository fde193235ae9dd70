//! User-facing notice texts.

use threadbot_types::completion::{CompletionOutcome, CompletionStatus};
use threadbot_types::platform::{NoticeLevel, OutboundMessage};
use threadbot_types::session::SessionConfig;

const TITLE_AUTHOR_CHARS: usize = 20;
const TITLE_MESSAGE_CHARS: usize = 30;

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Title of a newly opened conversation: `"{prefix} {author} - {message}"`.
pub fn conversation_title(prefix: &str, author: &str, first_message: &str) -> String {
    format!(
        "{prefix} {} - {}",
        truncate_chars(author, TITLE_AUTHOR_CHARS),
        truncate_chars(first_message, TITLE_MESSAGE_CHARS)
    )
}

/// Announcement posted when a conversation starts.
pub fn start_notice(author: &str, first_message: &str, config: &SessionConfig) -> OutboundMessage {
    OutboundMessage::notice(
        NoticeLevel::Info,
        format!(
            "{author} wants to ask a question! 🤖💬\n\
             model: {} | temperature: {} | max_tokens: {}\n\
             {author}: {first_message}",
            config.model, config.temperature, config.max_tokens
        ),
    )
}

/// The single notice for an outcome, or `None` when only the reply is sent.
///
/// A flagged outcome gets its warning here and still carries its reply.
pub fn outcome_notice(outcome: &CompletionOutcome, author: &str) -> Option<OutboundMessage> {
    let detail = outcome.status_text().unwrap_or("unknown error");
    match outcome.status() {
        CompletionStatus::Ok if outcome.reply_text().is_some() => None,
        CompletionStatus::Ok => Some(OutboundMessage::notice(
            NoticeLevel::Warning,
            "**Invalid response** - empty response",
        )),
        CompletionStatus::TooLong => Some(closed_notice("context limit reached")),
        CompletionStatus::InvalidRequest => Some(OutboundMessage::notice(
            NoticeLevel::Warning,
            format!("**Invalid request** - {detail}"),
        )),
        CompletionStatus::Failed | CompletionStatus::OtherError => Some(OutboundMessage::notice(
            NoticeLevel::Error,
            format!("**Error** - {detail}"),
        )),
        CompletionStatus::ModerationFlagged => Some(flagged_notice(author)),
        CompletionStatus::ModerationBlocked => Some(reply_blocked_notice()),
    }
}

pub fn flagged_notice(author: &str) -> OutboundMessage {
    OutboundMessage::notice(
        NoticeLevel::Warning,
        format!("⚠️ {author}'s message has been flagged by moderation."),
    )
}

pub fn blocked_notice(author: &str) -> OutboundMessage {
    OutboundMessage::notice(
        NoticeLevel::Error,
        format!("❌ **{author}'s message has been blocked by moderation.**"),
    )
}

pub fn reply_blocked_notice() -> OutboundMessage {
    OutboundMessage::notice(
        NoticeLevel::Error,
        "❌ **The reply has been blocked by moderation.**",
    )
}

pub fn closed_notice(reason: &str) -> OutboundMessage {
    OutboundMessage::notice(
        NoticeLevel::Info,
        format!("**Conversation closed** - {reason}"),
    )
}
