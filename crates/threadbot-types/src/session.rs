//! Conversation session types.
//!
//! A conversation session binds one local chat thread to one remote
//! assistant session, together with the generation settings chosen when the
//! conversation was started.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::error::SessionConfigError;

/// Lowest accepted sampling temperature.
pub const MIN_TEMPERATURE: f64 = 0.0;

/// Highest accepted sampling temperature.
pub const MAX_TEMPERATURE: f64 = 1.0;

/// Lowest accepted output token limit.
pub const MIN_MAX_TOKENS: u32 = 1;

/// Highest accepted output token limit.
pub const MAX_MAX_TOKENS: u32 = 4096;

/// Identifier of a local conversation thread on the chat platform.
///
/// Opaque to the core: equality is the only operation that matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Generation settings fixed at conversation start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl SessionConfig {
    /// Check the settings against the model allow-list and the accepted ranges.
    ///
    /// Out-of-range values are refused, never clamped.
    pub fn validate(&self, allowed_models: &[String]) -> Result<(), SessionConfigError> {
        if !allowed_models.iter().any(|m| m == &self.model) {
            return Err(SessionConfigError::UnknownModel(self.model.clone()));
        }
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(SessionConfigError::TemperatureOutOfRange(self.temperature));
        }
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
            return Err(SessionConfigError::MaxTokensOutOfRange(self.max_tokens));
        }
        Ok(())
    }
}

/// Snapshot of a conversation session owned by the session registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub local_id: ConversationId,
    pub remote_session_id: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Accepted user turns so far. Never decreases.
    pub turns_processed: u32,
    /// Once true, no further turns are accepted.
    pub closed: bool,
    pub created_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
