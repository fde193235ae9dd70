//! Infrastructure layer for threadbot.
//!
//! Contains the implementations of the collaborator traits defined in
//! `threadbot-core` that talk to the outside world (the OpenAI Assistants
//! and Moderation HTTP APIs) and the configuration loader.

pub mod config;
pub mod openai;
