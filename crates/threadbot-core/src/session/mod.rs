//! Conversation session ownership.
//!
//! The `SessionRegistry` maps local conversation ids to remote sessions and
//! is the only mutable state shared between concurrent turns.

pub mod handle;
pub mod registry;

pub use handle::SessionHandle;
pub use registry::SessionRegistry;
