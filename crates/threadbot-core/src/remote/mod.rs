//! Remote assistant API abstraction.
//!
//! The remote side owns sessions (threads of messages) and runs (one
//! asynchronous assistant execution per user turn). `RemoteRunClient` is the
//! port; the HTTP implementation lives in threadbot-infra.

pub mod client;

pub use client::RemoteRunClient;
