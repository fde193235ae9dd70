//! Live session record shared between the registry and in-flight turns.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use threadbot_types::session::{ConversationId, ConversationSession, SessionConfig};

/// A registered conversation session.
///
/// Identity and configuration are immutable after creation. The turn counter
/// only grows and the closed flag only goes from false to true, so both are
/// plain atomics. `turn_lock` serializes runs within one conversation.
#[derive(Debug)]
pub struct SessionHandle {
    local_id: ConversationId,
    remote_session_id: String,
    config: SessionConfig,
    created_at: DateTime<Utc>,
    turns_processed: AtomicU32,
    closed: AtomicBool,
    turn_lock: Mutex<()>,
}

impl SessionHandle {
    pub fn new(local_id: ConversationId, remote_session_id: String, config: SessionConfig) -> Self {
        Self {
            local_id,
            remote_session_id,
            config,
            created_at: Utc::now(),
            turns_processed: AtomicU32::new(0),
            closed: AtomicBool::new(false),
            turn_lock: Mutex::new(()),
        }
    }

    pub fn local_id(&self) -> &ConversationId {
        &self.local_id
    }

    pub fn remote_session_id(&self) -> &str {
        &self.remote_session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn turns_processed(&self) -> u32 {
        self.turns_processed.load(Ordering::Acquire)
    }

    /// Count one accepted user turn. Returns the new total.
    pub fn record_turn(&self) -> u32 {
        self.turns_processed.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark the session closed. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    /// Wait for exclusive use of the session for one turn.
    pub async fn lock_turn(&self) -> MutexGuard<'_, ()> {
        self.turn_lock.lock().await
    }

    /// Copy the current state into a plain data record.
    pub fn snapshot(&self) -> ConversationSession {
        ConversationSession {
            local_id: self.local_id.clone(),
            remote_session_id: self.remote_session_id.clone(),
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            turns_processed: self.turns_processed(),
            closed: self.is_closed(),
            created_at: self.created_at,
        }
    }
}
