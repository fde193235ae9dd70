use thiserror::Error;

use crate::session::ConversationId;

/// Reasons a conversation's generation settings are refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionConfigError {
    #[error("model '{0}' is not available")]
    UnknownModel(String),

    #[error("invalid temperature: {0}. Temperature must be between 0 and 1")]
    TemperatureOutOfRange(f64),

    #[error("invalid max_tokens: {0}. Max tokens must be between 1 and 4096")]
    MaxTokensOutOfRange(u32),
}

/// Errors from the remote assistant API.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The API rejected the request as invalid (HTTP 400).
    #[error("invalid request: {message}")]
    InvalidRequest {
        message: String,
        code: Option<String>,
    },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors from session registry operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested settings are out of range; no remote call was made.
    #[error(transparent)]
    InvalidConfig(#[from] SessionConfigError),

    /// The remote session could not be created. Nothing was registered.
    #[error("failed to create remote session: {0}")]
    Creation(#[source] RemoteError),
}

/// Precondition violations raised by the run orchestrator.
///
/// Remote failures are never raised; they become completion outcomes.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("conversation {0} is closed")]
    ConversationClosed(ConversationId),
}

/// Errors from the chat platform collaborator.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("conversation {0} not found")]
    ConversationNotFound(ConversationId),

    #[error("failed to send message: {0}")]
    Send(String),

    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

/// Errors from starting a new conversation.
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    InvalidConfig(#[from] SessionConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors from assembling runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API key: set {0}")]
    MissingApiKey(String),

    #[error("missing assistant id: set assistant_id in threadbot.toml or {0}")]
    MissingAssistantId(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
