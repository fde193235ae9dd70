pub mod render;
pub mod service;

pub use service::{
    ConversationService, IgnoreReason, StartConversation, StartedConversation, TurnDisposition,
};
