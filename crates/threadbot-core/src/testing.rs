//! In-memory collaborator doubles shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

use threadbot_types::error::{PlatformError, RemoteError};
use threadbot_types::moderation::ModerationVerdict;
use threadbot_types::platform::{ConversationState, MessageRef, OutboundMessage};
use threadbot_types::run::{
    ListOrder, MessageRole, RemoteMessage, RemoteRunStatus, RunLastError, RunSnapshot,
};
use threadbot_types::session::{ConversationId, SessionConfig};

use crate::moderation::ModerationGate;
use crate::platform::ChatPlatform;
use crate::remote::RemoteRunClient;

pub(crate) fn session_config() -> SessionConfig {
    SessionConfig {
        model: "gpt-4o".to_string(),
        temperature: 0.7,
        max_tokens: 512,
    }
}

pub(crate) fn allowed_models() -> Vec<String> {
    vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()]
}

pub(crate) fn snapshot(status: RemoteRunStatus) -> RunSnapshot {
    RunSnapshot {
        id: "run-1".to_string(),
        status,
        last_error: None,
    }
}

pub(crate) fn failed_snapshot(code: &str, message: &str) -> RunSnapshot {
    RunSnapshot {
        id: "run-1".to_string(),
        status: RemoteRunStatus::Failed,
        last_error: Some(RunLastError {
            code: code.to_string(),
            message: message.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Remote client
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct RemoteState {
    pub create_calls: u32,
    pub appended: Vec<(String, String)>,
    pub start_calls: u32,
    pub status_calls: u32,
    pub list_calls: u32,
    pub create_delay: Option<Duration>,
    pub fail_create: Option<RemoteError>,
    pub fail_append: Option<RemoteError>,
    pub fail_start: Option<RemoteError>,
    pub fail_list: Option<RemoteError>,
    /// Consumed front to back; the last entry repeats.
    pub statuses: VecDeque<Result<RunSnapshot, RemoteError>>,
    /// Returned newest first.
    pub messages: Vec<RemoteMessage>,
}

#[derive(Default)]
pub(crate) struct MockRemote {
    pub state: Mutex<RemoteState>,
}

impl MockRemote {
    /// A remote whose runs go queued -> in_progress -> completed with `reply`.
    pub fn replying(reply: &str) -> Self {
        let remote = Self::default();
        {
            let mut state = remote.state.lock().unwrap();
            state.statuses = VecDeque::from(vec![
                Ok(snapshot(RemoteRunStatus::Queued)),
                Ok(snapshot(RemoteRunStatus::InProgress)),
                Ok(snapshot(RemoteRunStatus::Completed)),
            ]);
            state.messages = vec![RemoteMessage {
                role: MessageRole::Assistant,
                text: reply.to_string(),
            }];
        }
        remote
    }

    pub fn with_statuses(self, statuses: Vec<Result<RunSnapshot, RemoteError>>) -> Self {
        self.state.lock().unwrap().statuses = VecDeque::from(statuses);
        self
    }

    pub fn with<F: FnOnce(&mut RemoteState)>(self, f: F) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn create_calls(&self) -> u32 {
        self.state.lock().unwrap().create_calls
    }

    pub fn appended(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().appended.clone()
    }

    pub fn start_calls(&self) -> u32 {
        self.state.lock().unwrap().start_calls
    }

    pub fn status_calls(&self) -> u32 {
        self.state.lock().unwrap().status_calls
    }
}

impl RemoteRunClient for MockRemote {
    async fn create_session(&self) -> Result<String, RemoteError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.create_calls += 1;
            state.create_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock().unwrap();
        match &state.fail_create {
            Some(err) => Err(err.clone()),
            None => Ok(format!("session-{}", state.create_calls)),
        }
    }

    async fn append_message(
        &self,
        session_id: &str,
        _role: MessageRole,
        text: &str,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_append {
            return Err(err.clone());
        }
        state.appended.push((session_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn start_run(&self, _session_id: &str, _config: &SessionConfig) -> Result<String, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.start_calls += 1;
        match &state.fail_start {
            Some(err) => Err(err.clone()),
            None => Ok("run-1".to_string()),
        }
    }

    async fn get_run_status(&self, _session_id: &str, _run_id: &str) -> Result<RunSnapshot, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.status_calls += 1;
        if state.statuses.len() > 1 {
            return state.statuses.pop_front().unwrap_or_else(|| Ok(snapshot(RemoteRunStatus::Completed)));
        }
        state
            .statuses
            .front()
            .cloned()
            .unwrap_or_else(|| Ok(snapshot(RemoteRunStatus::Completed)))
    }

    async fn list_messages(
        &self,
        _session_id: &str,
        order: ListOrder,
        limit: u32,
    ) -> Result<Vec<RemoteMessage>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if let Some(err) = &state.fail_list {
            return Err(err.clone());
        }
        let mut messages: Vec<RemoteMessage> =
            state.messages.iter().take(limit as usize).cloned().collect();
        if order == ListOrder::Asc {
            messages.reverse();
        }
        Ok(messages)
    }
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

/// Returns `Blocked`/`Flagged` for texts containing the configured words.
#[derive(Default)]
pub(crate) struct KeywordModeration {
    pub blocked_word: Option<String>,
    pub flagged_word: Option<String>,
    pub checked: Mutex<Vec<String>>,
}

impl KeywordModeration {
    pub fn blocking(word: &str) -> Self {
        Self {
            blocked_word: Some(word.to_string()),
            ..Default::default()
        }
    }

    pub fn flagging(word: &str) -> Self {
        Self {
            flagged_word: Some(word.to_string()),
            ..Default::default()
        }
    }
}

impl ModerationGate for KeywordModeration {
    async fn check(&self, text: &str) -> Result<ModerationVerdict, RemoteError> {
        self.checked.lock().unwrap().push(text.to_string());
        if self.blocked_word.as_deref().is_some_and(|w| text.contains(w)) {
            return Ok(ModerationVerdict::Blocked);
        }
        if self.flagged_word.as_deref().is_some_and(|w| text.contains(w)) {
            return Ok(ModerationVerdict::Flagged);
        }
        Ok(ModerationVerdict::Allowed)
    }
}

// ---------------------------------------------------------------------------
// Chat platform
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct PlatformState {
    pub opened: Vec<String>,
    pub sent: Vec<(ConversationId, OutboundMessage)>,
    pub closed: Vec<ConversationId>,
    pub latest: Option<MessageRef>,
    pub conversation: ConversationState,
    pub fail_latest: bool,
}

#[derive(Default)]
pub(crate) struct MockPlatform {
    pub state: Mutex<PlatformState>,
}

impl MockPlatform {
    pub fn with<F: FnOnce(&mut PlatformState)>(self, f: F) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn set_latest(&self, latest: Option<MessageRef>) {
        self.state.lock().unwrap().latest = latest;
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn closed(&self) -> Vec<ConversationId> {
        self.state.lock().unwrap().closed.clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.lock().unwrap().opened.clone()
    }
}

impl ChatPlatform for MockPlatform {
    async fn open_conversation(&self, title: &str) -> Result<ConversationId, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.opened.push(title.to_string());
        Ok(ConversationId::new(format!("conv-{}", state.opened.len())))
    }

    async fn latest_message(
        &self,
        _conversation: &ConversationId,
    ) -> Result<Option<MessageRef>, PlatformError> {
        let state = self.state.lock().unwrap();
        if state.fail_latest {
            return Err(PlatformError::Unavailable("history unavailable".to_string()));
        }
        Ok(state.latest.clone())
    }

    async fn conversation_state(
        &self,
        _conversation: &ConversationId,
    ) -> Result<ConversationState, PlatformError> {
        Ok(self.state.lock().unwrap().conversation.clone())
    }

    async fn send(
        &self,
        conversation: &ConversationId,
        message: OutboundMessage,
    ) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .sent
            .push((conversation.clone(), message));
        Ok(())
    }

    async fn close_conversation(&self, conversation: &ConversationId) -> Result<(), PlatformError> {
        self.state.lock().unwrap().closed.push(conversation.clone());
        Ok(())
    }
}

pub(crate) fn message_ref(id: &str, author: &str, at: DateTime<Utc>, is_from_bot: bool) -> MessageRef {
    MessageRef {
        id: id.to_string(),
        author_id: author.to_string(),
        timestamp: at,
        is_from_bot,
    }
}
