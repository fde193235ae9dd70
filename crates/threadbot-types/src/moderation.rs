//! Moderation verdict contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-way classification of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationVerdict {
    Allowed,
    /// Let through, but the dispatch layer shows a warning.
    Flagged,
    /// Never submitted or dispatched.
    Blocked,
}

impl ModerationVerdict {
    /// The more severe of two verdicts.
    pub fn most_severe(self, other: ModerationVerdict) -> ModerationVerdict {
        use ModerationVerdict::*;
        match (self, other) {
            (Blocked, _) | (_, Blocked) => Blocked,
            (Flagged, _) | (_, Flagged) => Flagged,
            _ => Allowed,
        }
    }
}

impl fmt::Display for ModerationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModerationVerdict::Allowed => write!(f, "allowed"),
            ModerationVerdict::Flagged => write!(f, "flagged"),
            ModerationVerdict::Blocked => write!(f, "blocked"),
        }
    }
}
