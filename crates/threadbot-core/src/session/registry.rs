//! Session registry: local conversation id -> remote session.
//!
//! Backed by a `DashMap` of per-key `OnceCell`s. The map entry is created
//! (or found) under the shard lock and the guard is dropped immediately; the
//! remote create call then runs inside the cell's initializer, so concurrent
//! callers for the same id wait on one creation instead of racing, and no
//! `DashMap` guard is ever held across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use threadbot_types::error::SessionError;
use threadbot_types::session::{ConversationId, SessionConfig};

use crate::remote::RemoteRunClient;

use super::handle::SessionHandle;

type SessionSlot = Arc<OnceCell<Arc<SessionHandle>>>;

/// Owns every conversation session for the lifetime of the process.
///
/// Closed sessions stay registered so a closed conversation can never be
/// bound to a second remote session.
pub struct SessionRegistry<C: RemoteRunClient> {
    client: Arc<C>,
    allowed_models: Vec<String>,
    sessions: DashMap<ConversationId, SessionSlot>,
}

impl<C: RemoteRunClient> SessionRegistry<C> {
    /// Create an empty registry.
    ///
    /// `allowed_models` is the model allow-list enforced on creation.
    pub fn new(client: Arc<C>, allowed_models: Vec<String>) -> Self {
        Self {
            client,
            allowed_models,
            sessions: DashMap::new(),
        }
    }

    /// Return the session for `local_id`, creating the remote session if needed.
    ///
    /// For an existing session `desired` is ignored: configuration is fixed at
    /// creation. For a new one, `desired` is validated first and refused
    /// without any remote call when out of range. A failed remote create
    /// leaves nothing registered.
    pub async fn get_or_create(
        &self,
        local_id: &ConversationId,
        desired: &SessionConfig,
    ) -> Result<Arc<SessionHandle>, SessionError> {
        if let Some(existing) = self.get(local_id) {
            return Ok(existing);
        }

        desired.validate(&self.allowed_models)?;

        let slot = self.sessions.entry(local_id.clone()).or_default().clone();

        let result = slot
            .get_or_try_init(|| async {
                let remote_session_id = self
                    .client
                    .create_session()
                    .await
                    .map_err(SessionError::Creation)?;
                info!(
                    conversation_id = %local_id,
                    remote_session_id = %remote_session_id,
                    model = %desired.model,
                    "Session created"
                );
                Ok(Arc::new(SessionHandle::new(
                    local_id.clone(),
                    remote_session_id,
                    desired.clone(),
                )))
            })
            .await
            .cloned();

        if let Err(ref err) = result {
            warn!(conversation_id = %local_id, error = %err, "Session creation failed");
            self.sessions
                .remove_if(local_id, |_, s| Arc::ptr_eq(s, &slot) && !s.initialized());
        }

        result
    }

    /// Look up a session without creating one.
    pub fn get(&self, local_id: &ConversationId) -> Option<Arc<SessionHandle>> {
        self.sessions
            .get(local_id)
            .and_then(|slot| slot.get().cloned())
    }

    /// Mark a session closed. Idempotent; unknown ids are ignored.
    pub fn close(&self, local_id: &ConversationId) {
        match self.get(local_id) {
            Some(session) => {
                if session.close() {
                    info!(
                        conversation_id = %local_id,
                        turns = session.turns_processed(),
                        "Session closed"
                    );
                }
            }
            None => debug!(conversation_id = %local_id, "Close requested for unknown session"),
        }
    }

    /// Whether the session exists and is closed.
    pub fn is_closed(&self, local_id: &ConversationId) -> bool {
        self.get(local_id).is_some_and(|s| s.is_closed())
    }

    /// Number of registered sessions, open or closed.
    pub fn len(&self) -> usize {
        self.sessions.iter().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
