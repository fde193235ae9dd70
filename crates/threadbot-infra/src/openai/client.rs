//! AssistantsClient -- concrete [`RemoteRunClient`] for the OpenAI Assistants v2 API.
//!
//! A remote session is an Assistants thread; a run is started against the
//! configured assistant with the session's model and sampling settings.

use std::sync::Arc;

use tracing::debug;

use threadbot_core::remote::RemoteRunClient;
use threadbot_types::error::RemoteError;
use threadbot_types::run::{ListOrder, MessageRole, RemoteMessage, RunSnapshot};
use threadbot_types::session::SessionConfig;

use super::http::OpenAiHttp;
use super::types::{
    CreateMessageRequest, CreateRunRequest, MessageList, RunObject, ThreadObject,
};

pub struct AssistantsClient {
    http: Arc<OpenAiHttp>,
    assistant_id: String,
}

impl AssistantsClient {
    pub fn new(http: Arc<OpenAiHttp>, assistant_id: impl Into<String>) -> Self {
        Self {
            http,
            assistant_id: assistant_id.into(),
        }
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }
}

impl RemoteRunClient for AssistantsClient {
    async fn create_session(&self) -> Result<String, RemoteError> {
        let request = self.http.post("/threads").json(&serde_json::json!({}));
        let thread: ThreadObject = self.http.send_json(request).await?;
        debug!(thread_id = %thread.id, "Created assistant thread");
        Ok(thread.id)
    }

    async fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<(), RemoteError> {
        let request = self
            .http
            .post(&format!("/threads/{session_id}/messages"))
            .json(&CreateMessageRequest { role, content: text });
        // Only success matters; the created message object is discarded.
        let _: serde_json::Value = self.http.send_json(request).await?;
        Ok(())
    }

    async fn start_run(&self, session_id: &str, config: &SessionConfig) -> Result<String, RemoteError> {
        let body = CreateRunRequest {
            assistant_id: &self.assistant_id,
            model: &config.model,
            temperature: config.temperature,
            max_completion_tokens: config.max_tokens,
        };
        let request = self
            .http
            .post(&format!("/threads/{session_id}/runs"))
            .json(&body);
        let run: RunObject = self.http.send_json(request).await?;
        Ok(run.id)
    }

    async fn get_run_status(&self, session_id: &str, run_id: &str) -> Result<RunSnapshot, RemoteError> {
        let request = self.http.get(&format!("/threads/{session_id}/runs/{run_id}"));
        let run: RunObject = self.http.send_json(request).await?;
        Ok(run.into())
    }

    async fn list_messages(
        &self,
        session_id: &str,
        order: ListOrder,
        limit: u32,
    ) -> Result<Vec<RemoteMessage>, RemoteError> {
        let request = self
            .http
            .get(&format!("/threads/{session_id}/messages"))
            .query(&[("order", order.to_string()), ("limit", limit.to_string())]);
        let list: MessageList = self.http.send_json(request).await?;
        Ok(list.data.into_iter().map(RemoteMessage::from).collect())
    }
}
