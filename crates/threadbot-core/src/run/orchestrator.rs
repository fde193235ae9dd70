//! RunOrchestrator: one user turn from submission to a classified outcome.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use threadbot_types::completion::{CompletionOutcome, CompletionStatus};
use threadbot_types::config::BotConfig;
use threadbot_types::error::OrchestratorError;
use threadbot_types::run::{ListOrder, MessageRole, RemoteRunStatus};

use crate::remote::RemoteRunClient;
use crate::session::SessionHandle;

use super::classify::ErrorClassifier;
use super::policy::PollPolicy;
use super::state::RunPhase;

/// How many recent messages to fetch when looking for the reply.
const REPLY_LOOKBACK: u32 = 10;

/// Submits turns and waits for their runs.
///
/// Remote failures never escape: they are classified into a
/// [`CompletionOutcome`]. The only raised error is submitting to a closed
/// session.
pub struct RunOrchestrator<C: RemoteRunClient> {
    client: Arc<C>,
    policy: PollPolicy,
    classifier: ErrorClassifier,
}

impl<C: RemoteRunClient> RunOrchestrator<C> {
    pub fn new(client: Arc<C>, policy: PollPolicy, classifier: ErrorClassifier) -> Self {
        Self {
            client,
            policy,
            classifier,
        }
    }

    pub fn from_config(client: Arc<C>, config: &BotConfig) -> Self {
        Self::new(
            client,
            PollPolicy::from_config(config),
            ErrorClassifier::new(config.context_length_marker.clone()),
        )
    }

    /// Append `user_text` to the session, run the assistant, and wait for it.
    ///
    /// Holds the session's turn lock for the whole call, so runs within one
    /// conversation never overlap.
    pub async fn submit_and_wait(
        &self,
        session: &SessionHandle,
        user_text: &str,
    ) -> Result<CompletionOutcome, OrchestratorError> {
        if session.is_closed() {
            return Err(OrchestratorError::ConversationClosed(session.local_id().clone()));
        }

        let _turn = session.lock_turn().await;
        // The conversation may have been closed while waiting for the lock.
        if session.is_closed() {
            return Err(OrchestratorError::ConversationClosed(session.local_id().clone()));
        }

        let config = session.config();
        let span = info_span!(
            "gen_ai.run",
            gen_ai.operation.name = "chat",
            gen_ai.request.model = %config.model,
            gen_ai.request.max_tokens = config.max_tokens,
            gen_ai.request.temperature = config.temperature,
            conversation_id = %session.local_id(),
        );

        let outcome = self.run_turn(session, user_text).instrument(span).await;
        info!(
            conversation_id = %session.local_id(),
            status = %outcome.status(),
            turns = session.turns_processed(),
            "Turn finished"
        );
        Ok(outcome)
    }

    async fn run_turn(&self, session: &SessionHandle, user_text: &str) -> CompletionOutcome {
        let session_id = session.remote_session_id();

        if let Err(e) = self
            .client
            .append_message(session_id, MessageRole::User, user_text)
            .await
        {
            warn!(error = %e, "Failed to append user message");
            return self.classifier.classify_error(&e);
        }
        session.record_turn();

        // The message is already in the session; a failed start is not retried
        // and never resends it.
        let run_id = match self.client.start_run(session_id, session.config()).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to start run");
                return CompletionOutcome::failure(
                    CompletionStatus::OtherError,
                    format!("failed to start run: {e}"),
                );
            }
        };
        debug!(run_id = %run_id, "Run started");

        let started = Instant::now();
        let mut phase = RunPhase::Queued;
        let snapshot = loop {
            if self.policy.deadline_exceeded(started.elapsed()) {
                warn!(run_id = %run_id, phase = ?phase, "Run deadline exceeded");
                return CompletionOutcome::failure(
                    CompletionStatus::OtherError,
                    format!(
                        "run {run_id} did not finish within {}s",
                        started.elapsed().as_secs()
                    ),
                );
            }

            tokio::time::sleep(self.policy.interval).await;

            let snapshot = match self.client.get_run_status(session_id, &run_id).await {
                Ok(s) => s,
                Err(e) => {
                    warn!(run_id = %run_id, error = %e, "Failed to poll run");
                    return self.classifier.classify_error(&e);
                }
            };

            let next = phase.advance(snapshot.status);
            if next != phase {
                debug!(run_id = %run_id, from = ?phase, to = ?next, "Run phase changed");
            }
            phase = next;
            if phase.is_terminal() {
                break snapshot;
            }
        };

        if snapshot.status != RemoteRunStatus::Completed {
            warn!(
                run_id = %run_id,
                status = %snapshot.status,
                last_error = ?snapshot.last_error,
                "Run ended without completing"
            );
            return self.classifier.classify_run(&snapshot);
        }

        match self
            .client
            .list_messages(session_id, ListOrder::Desc, REPLY_LOOKBACK)
            .await
        {
            Ok(messages) => {
                let reply = messages
                    .into_iter()
                    .find(|m| m.role == MessageRole::Assistant)
                    .map(|m| m.text)
                    .unwrap_or_default();
                debug!(run_id = %run_id, reply_chars = reply.chars().count(), "Run completed");
                CompletionOutcome::completed(reply)
            }
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Failed to fetch reply");
                self.classifier.classify_error(&e)
            }
        }
    }
}
