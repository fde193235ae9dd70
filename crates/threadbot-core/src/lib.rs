//! Conversation run orchestration for threadbot.
//!
//! This crate defines the collaborator traits (remote assistant API,
//! moderation, chat platform) that the infrastructure layer implements, and
//! the business logic built on them: the session registry, the run
//! orchestrator, staleness gating, reply segmentation, and the conversation
//! service that wires them together. It depends only on `threadbot-types` --
//! never on `threadbot-infra` or any HTTP crate.

pub mod conversation;
pub mod moderation;
pub mod platform;
pub mod remote;
pub mod run;
pub mod segment;
pub mod session;
pub mod staleness;

#[cfg(test)]
pub(crate) mod testing;
