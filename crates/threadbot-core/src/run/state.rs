//! Client-side view of a remote run's lifecycle.

use tracing::debug;

use threadbot_types::run::RemoteRunStatus;

/// Where a run is in `queued -> in_progress -> terminal`.
///
/// The phase only moves forward. A late `queued` report after the run was
/// seen in progress is ignored, and a terminal phase never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Queued,
    InProgress,
    Terminal(RemoteRunStatus),
}

impl RunPhase {
    /// Fold one observed remote status into the phase.
    pub fn advance(self, observed: RemoteRunStatus) -> RunPhase {
        match (self, observed) {
            (RunPhase::Terminal(_), _) => self,
            (_, status) if status.is_terminal() => RunPhase::Terminal(status),
            // Tool calls are never registered with the assistant, so a run that
            // asks for one cannot make progress.
            (_, RemoteRunStatus::RequiresAction) => {
                RunPhase::Terminal(RemoteRunStatus::RequiresAction)
            }
            (RunPhase::Queued, RemoteRunStatus::Queued) => RunPhase::Queued,
            (_, RemoteRunStatus::InProgress | RemoteRunStatus::Cancelling) => RunPhase::InProgress,
            (RunPhase::InProgress, RemoteRunStatus::Queued) => {
                debug!("Ignoring queued status for a run already in progress");
                RunPhase::InProgress
            }
            (_, _) => self,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Terminal(_))
    }
}
