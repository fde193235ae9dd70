//! Configuration types for threadbot.
//!
//! `BotConfig` represents `threadbot.toml`, which controls the assistant
//! binding, conversation limits, run polling, reply segmentation, and
//! moderation thresholds. Every field has a default so an empty file is valid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;

/// Marker the remote API puts in errors when the context window is exceeded.
pub const DEFAULT_CONTEXT_LENGTH_MARKER: &str = "This model's maximum context length";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Remote assistant that runs are started against.
    #[serde(default)]
    pub assistant_id: Option<String>,

    /// Base URL of the assistant API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Models users may pick when starting a conversation.
    #[serde(default = "default_allowed_models")]
    pub allowed_models: Vec<String>,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Conversations with more messages than this are closed.
    #[serde(default = "default_max_conversation_messages")]
    pub max_conversation_messages: u32,

    /// Delay before processing a message, to coalesce rapid follow-ups. 0 disables.
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: u64,

    /// Interval between run status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Overall limit on waiting for one run. 0 waits forever.
    #[serde(default = "default_run_deadline_secs")]
    pub run_deadline_secs: u64,

    /// Maximum characters per reply segment.
    #[serde(default = "default_max_segment_chars")]
    pub max_segment_chars: usize,

    /// Substring that identifies a context-window error.
    #[serde(default = "default_context_length_marker")]
    pub context_length_marker: String,

    /// Prefix for conversation titles created by the bot.
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,

    /// Servers the bot answers in. Empty allows all.
    #[serde(default)]
    pub allowed_server_ids: Vec<String>,

    #[serde(default)]
    pub moderation: ModerationConfig,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_allowed_models() -> Vec<String> {
    vec![
        "gpt-4o".to_string(),
        "gpt-4o-mini".to_string(),
        "gpt-4-turbo".to_string(),
        "gpt-3.5-turbo".to_string(),
    ]
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    1.0
}

fn default_max_tokens() -> u32 {
    512
}

fn default_max_conversation_messages() -> u32 {
    200
}

fn default_debounce_secs() -> u64 {
    3
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_run_deadline_secs() -> u64 {
    600
}

fn default_max_segment_chars() -> usize {
    1500
}

fn default_context_length_marker() -> String {
    DEFAULT_CONTEXT_LENGTH_MARKER.to_string()
}

fn default_title_prefix() -> String {
    "💬✅".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            assistant_id: None,
            api_base: default_api_base(),
            allowed_models: default_allowed_models(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            max_conversation_messages: default_max_conversation_messages(),
            debounce_secs: default_debounce_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            run_deadline_secs: default_run_deadline_secs(),
            max_segment_chars: default_max_segment_chars(),
            context_length_marker: default_context_length_marker(),
            title_prefix: default_title_prefix(),
            allowed_server_ids: Vec::new(),
            moderation: ModerationConfig::default(),
        }
    }
}

impl BotConfig {
    /// Fill unset conversation settings from the configured defaults.
    pub fn session_config(
        &self,
        model: Option<String>,
        temperature: Option<f64>,
        max_tokens: Option<u32>,
    ) -> SessionConfig {
        SessionConfig {
            model: model.unwrap_or_else(|| self.default_model.clone()),
            temperature: temperature.unwrap_or(self.default_temperature),
            max_tokens: max_tokens.unwrap_or(self.default_max_tokens),
        }
    }

    /// Whether messages from the given server should be answered.
    pub fn is_server_allowed(&self, server_id: Option<&str>) -> bool {
        if self.allowed_server_ids.is_empty() {
            return true;
        }
        server_id.is_some_and(|id| self.allowed_server_ids.iter().any(|s| s == id))
    }
}

/// Moderation settings.
///
/// Thresholds map a moderation category to the minimum score at which the
/// verdict applies. Blocked thresholds are checked before flagged ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    #[serde(default = "default_moderation_enabled")]
    pub enabled: bool,

    #[serde(default = "default_blocked_thresholds")]
    pub blocked_thresholds: BTreeMap<String, f64>,

    #[serde(default = "default_flagged_thresholds")]
    pub flagged_thresholds: BTreeMap<String, f64>,
}

fn default_moderation_enabled() -> bool {
    true
}

fn thresholds(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn default_blocked_thresholds() -> BTreeMap<String, f64> {
    thresholds(&[
        ("harassment", 0.5),
        ("harassment/threatening", 0.1),
        ("hate", 0.5),
        ("hate/threatening", 0.1),
        ("self-harm", 0.8),
        ("self-harm/instructions", 0.3),
        ("self-harm/intent", 0.7),
        ("sexual", 0.5),
        ("sexual/minors", 0.2),
        ("violence", 0.7),
        ("violence/graphic", 0.8),
    ])
}

fn default_flagged_thresholds() -> BTreeMap<String, f64> {
    thresholds(&[
        ("harassment", 0.5),
        ("harassment/threatening", 0.1),
        ("hate", 0.4),
        ("hate/threatening", 0.05),
        ("self-harm", 0.4),
        ("self-harm/instructions", 0.2),
        ("self-harm/intent", 0.4),
        ("sexual", 0.3),
        ("sexual/minors", 0.1),
        ("violence", 0.1),
        ("violence/graphic", 0.1),
    ])
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enabled: default_moderation_enabled(),
            blocked_thresholds: default_blocked_thresholds(),
            flagged_thresholds: default_flagged_thresholds(),
        }
    }
}
