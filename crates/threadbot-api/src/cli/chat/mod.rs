//! Interactive terminal conversation.
//!
//! The terminal acts as the chat platform: the user's lines become inbound
//! messages, and replies and notices are printed above the prompt.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod platform;
