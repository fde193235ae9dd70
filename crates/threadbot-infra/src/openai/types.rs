//! OpenAI Assistants v2 and Moderation API wire types.
//!
//! These are provider-specific request/response structures. They are NOT the
//! generic run types from threadbot-types, which the client converts to.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use threadbot_types::run::{MessageRole, RemoteMessage, RemoteRunStatus, RunLastError, RunSnapshot};

/// Response body for thread creation. Only the id is used.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadObject {
    pub id: String,
}

/// Request body for `POST /threads/{id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest<'a> {
    pub role: MessageRole,
    pub content: &'a str,
}

/// Request body for `POST /threads/{id}/runs`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest<'a> {
    pub assistant_id: &'a str,
    pub model: &'a str,
    pub temperature: f64,
    pub max_completion_tokens: u32,
}

/// Run object returned by run creation and retrieval.
#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub status: RemoteRunStatus,
    #[serde(default)]
    pub last_error: Option<RunErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunErrorObject {
    pub code: String,
    pub message: String,
}

impl From<RunObject> for RunSnapshot {
    fn from(run: RunObject) -> Self {
        RunSnapshot {
            id: run.id,
            status: run.status,
            last_error: run.last_error.map(|e| RunLastError {
                code: e.code,
                message: e.message,
            }),
        }
    }
}

/// Page of thread messages.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    pub data: Vec<MessageObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageObject {
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

/// One content part of a message. Only text parts carry reply text.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    pub value: String,
}

impl From<MessageObject> for RemoteMessage {
    fn from(message: MessageObject) -> Self {
        let text = message
            .content
            .into_iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value),
                MessageContent::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");
        RemoteMessage {
            role: message.role,
            text,
        }
    }
}

/// Request body for `POST /moderations`.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationRequest<'a> {
    pub input: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerationResponse {
    pub results: Vec<ModerationResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerationResult {
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub category_scores: HashMap<String, f64>,
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_object_parses_failed_run() {
        let json = r#"{
            "id": "run_abc",
            "object": "thread.run",
            "status": "failed",
            "last_error": {"code": "server_error", "message": "Something broke"}
        }"#;
        let snapshot: RunSnapshot = serde_json::from_str::<RunObject>(json).unwrap().into();
        assert_eq!(snapshot.status, RemoteRunStatus::Failed);
        assert_eq!(snapshot.last_error.unwrap().code, "server_error");
    }

    #[test]
    fn test_run_object_null_last_error() {
        let json = r#"{"id": "run_abc", "status": "in_progress", "last_error": null}"#;
        let run: RunObject = serde_json::from_str(json).unwrap();
        assert_eq!(run.status, RemoteRunStatus::InProgress);
        assert!(run.last_error.is_none());
    }

    #[test]
    fn test_message_text_parts_are_joined() {
        let json = r#"{
            "data": [{
                "id": "msg_1",
                "role": "assistant",
                "content": [
                    {"type": "text", "text": {"value": "Hello ", "annotations": []}},
                    {"type": "image_file", "image_file": {"file_id": "file_1"}},
                    {"type": "text", "text": {"value": "world", "annotations": []}}
                ]
            }]
        }"#;
        let list: MessageList = serde_json::from_str(json).unwrap();
        let message: RemoteMessage = list.data.into_iter().next().unwrap().into();
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.text, "Hello world");
    }

    #[test]
    fn test_create_run_request_shape() {
        let body = CreateRunRequest {
            assistant_id: "asst_1",
            model: "gpt-4o",
            temperature: 0.5,
            max_completion_tokens: 512,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["assistant_id"], "asst_1");
        assert_eq!(value["max_completion_tokens"], 512);
    }

    #[test]
    fn test_error_envelope_with_code() {
        let json = r#"{"error": {"message": "bad", "type": "invalid_request_error", "param": null, "code": "context_length_exceeded"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error.code.as_deref(), Some("context_length_exceeded"));
    }
}
