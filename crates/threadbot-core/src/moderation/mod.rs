pub mod box_gate;
pub mod gate;

pub use box_gate::BoxModerationGate;
pub use gate::{check_fail_open, AllowAllModeration, ModerationGate};
