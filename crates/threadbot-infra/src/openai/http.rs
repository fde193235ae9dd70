//! Shared HTTP plumbing for the OpenAI endpoints.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header. It never appears in Debug
//! output or tracing logs.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use threadbot_types::error::RemoteError;

use super::types::ErrorEnvelope;

/// Per-request timeout. Run polling keeps individual calls short.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Authenticated HTTP client for one OpenAI-compatible base URL.
pub struct OpenAiHttp {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiHttp {
    pub fn new(api_key: SecretString, base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(self.url(path)))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(self.url(path)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.api_key.expose_secret())
            .header("OpenAI-Beta", "assistants=v2")
    }

    /// Send a request and decode a JSON body, mapping failures to [`RemoteError`].
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Deserialization(format!("failed to parse response: {e}")))
    }
}

/// Map a non-success response to a [`RemoteError`].
///
/// 400 is the only status treated as a request validation error; its message
/// and code are what the run classifier looks at.
pub(crate) fn error_from_status(status: StatusCode, body: &str) -> RemoteError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| body.to_string());

    match status.as_u16() {
        400 => RemoteError::InvalidRequest {
            message,
            code: parsed.and_then(|e| e.error.code),
        },
        401 => RemoteError::AuthenticationFailed,
        429 => RemoteError::RateLimited(message),
        code => RemoteError::Api {
            status: code,
            message,
        },
    }
}
