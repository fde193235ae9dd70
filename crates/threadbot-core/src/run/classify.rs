//! Mapping of remote failures to completion outcomes.
//!
//! Context-window detection is a substring match on the error message (the
//! remote API reports it only in prose), with the structured
//! `context_length_exceeded` code honoured when present.

use threadbot_types::completion::{CompletionOutcome, CompletionStatus};
use threadbot_types::config::DEFAULT_CONTEXT_LENGTH_MARKER;
use threadbot_types::error::RemoteError;
use threadbot_types::run::{RemoteRunStatus, RunSnapshot};

const CONTEXT_LENGTH_CODE: &str = "context_length_exceeded";
const INVALID_PROMPT_CODE: &str = "invalid_prompt";

#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    context_length_marker: String,
}

impl ErrorClassifier {
    pub fn new(context_length_marker: impl Into<String>) -> Self {
        Self {
            context_length_marker: context_length_marker.into(),
        }
    }

    fn is_context_length(&self, message: &str, code: Option<&str>) -> bool {
        code == Some(CONTEXT_LENGTH_CODE)
            || (!self.context_length_marker.is_empty()
                && message.contains(&self.context_length_marker))
    }

    /// Classify an error returned by a remote call.
    pub fn classify_error(&self, err: &RemoteError) -> CompletionOutcome {
        match err {
            RemoteError::InvalidRequest { message, code } => {
                if self.is_context_length(message, code.as_deref()) {
                    CompletionOutcome::failure(CompletionStatus::TooLong, message.clone())
                } else {
                    CompletionOutcome::failure(CompletionStatus::InvalidRequest, message.clone())
                }
            }
            other => CompletionOutcome::failure(CompletionStatus::OtherError, other.to_string()),
        }
    }

    /// Classify a run that reached a terminal status other than `completed`.
    pub fn classify_run(&self, snapshot: &RunSnapshot) -> CompletionOutcome {
        if let Some(last_error) = &snapshot.last_error {
            if self.is_context_length(&last_error.message, Some(&last_error.code)) {
                return CompletionOutcome::failure(
                    CompletionStatus::TooLong,
                    last_error.message.clone(),
                );
            }
            if last_error.code == INVALID_PROMPT_CODE {
                return CompletionOutcome::failure(
                    CompletionStatus::InvalidRequest,
                    last_error.message.clone(),
                );
            }
            return CompletionOutcome::failure(
                CompletionStatus::Failed,
                format!("run {} {}: {}", snapshot.id, snapshot.status, last_error.message),
            );
        }

        let detail = match snapshot.status {
            RemoteRunStatus::RequiresAction => "requested a tool call, which is not supported",
            RemoteRunStatus::Expired => "expired before completing",
            RemoteRunStatus::Cancelled => "was cancelled",
            RemoteRunStatus::Incomplete => "ended incomplete",
            _ => "failed without an error",
        };
        CompletionOutcome::failure(
            CompletionStatus::Failed,
            format!("run {} {detail}", snapshot.id),
        )
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_LENGTH_MARKER)
    }
}
