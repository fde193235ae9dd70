//! RemoteRunClient trait definition.

use threadbot_types::error::RemoteError;
use threadbot_types::run::{ListOrder, MessageRole, RemoteMessage, RunSnapshot};
use threadbot_types::session::SessionConfig;

/// Port to the remote assistant job API.
///
/// Implementations must be stateless with respect to conversations and safe
/// to share across concurrently running turns. Every call may fail; the run
/// orchestrator converts failures into completion outcomes.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait RemoteRunClient: Send + Sync {
    /// Create an empty remote session and return its id.
    fn create_session(
        &self,
    ) -> impl std::future::Future<Output = Result<String, RemoteError>> + Send;

    /// Append a message to a remote session.
    fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;

    /// Start a run over the session's messages and return the run id.
    ///
    /// The session's generation settings travel with the run.
    fn start_run(
        &self,
        session_id: &str,
        config: &SessionConfig,
    ) -> impl std::future::Future<Output = Result<String, RemoteError>> + Send;

    /// Fetch the current state of a run.
    fn get_run_status(
        &self,
        session_id: &str,
        run_id: &str,
    ) -> impl std::future::Future<Output = Result<RunSnapshot, RemoteError>> + Send;

    /// List up to `limit` session messages in the given order.
    fn list_messages(
        &self,
        session_id: &str,
        order: ListOrder,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<RemoteMessage>, RemoteError>> + Send;
}
