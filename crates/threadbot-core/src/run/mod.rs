pub mod classify;
pub mod orchestrator;
pub mod policy;
pub mod state;

pub use classify::ErrorClassifier;
pub use orchestrator::RunOrchestrator;
pub use policy::PollPolicy;
pub use state::RunPhase;
