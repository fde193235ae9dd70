//! OpenAI HTTP clients: the Assistants v2 run client and the moderation gate.

pub mod client;
pub mod http;
pub mod moderation;
pub mod types;

pub use client::AssistantsClient;
pub use http::OpenAiHttp;
pub use moderation::OpenAiModeration;
