//! ModerationGate trait definition.

use tracing::warn;

use threadbot_types::error::RemoteError;
use threadbot_types::moderation::ModerationVerdict;

/// Classifies text as allowed, flagged or blocked.
///
/// Applied to inbound user text before submission and to reply text before
/// dispatch. Only the verdict contract lives here; scoring is up to the
/// implementation.
pub trait ModerationGate: Send + Sync {
    fn check(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<ModerationVerdict, RemoteError>> + Send;
}

/// Gate used when moderation is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllModeration;

impl ModerationGate for AllowAllModeration {
    async fn check(&self, _text: &str) -> Result<ModerationVerdict, RemoteError> {
        Ok(ModerationVerdict::Allowed)
    }
}

/// Run `gate` and treat a failed check as `Allowed`.
///
/// An unreachable moderation endpoint must not silence the bot, so the
/// failure is only logged.
pub async fn check_fail_open<G: ModerationGate + ?Sized>(gate: &G, text: &str) -> ModerationVerdict {
    match gate.check(text).await {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(error = %e, "Moderation check failed, allowing text");
            ModerationVerdict::Allowed
        }
    }
}
