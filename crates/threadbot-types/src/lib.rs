//! Shared domain types for threadbot.
//!
//! This crate contains the domain types used across the threadbot workspace:
//! conversation sessions, remote runs, completion outcomes, moderation
//! verdicts, chat platform messages, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod completion;
pub mod config;
pub mod error;
pub mod moderation;
pub mod platform;
pub mod run;
pub mod session;
