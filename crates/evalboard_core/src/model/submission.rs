//! Reviewer submission lifecycle.
//!
//! State is derived, never stored: the reviewer's `submitted` flag plus the
//! number of saved evaluations against the current proposal count.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SubmissionState {
    /// No saved evaluation yet (or nothing to score).
    NotStarted,
    /// Some but not all proposals scored.
    InProgress { scored: usize, required: usize },
    /// Every proposal scored; may submit.
    AllScored,
    /// Frozen until an administrator unlocks.
    Submitted,
}

impl SubmissionState {
    pub fn derive(submitted: bool, scored: usize, required: usize) -> Self {
        if submitted {
            return Self::Submitted;
        }
        if required == 0 || scored == 0 {
            return Self::NotStarted;
        }
        if scored < required {
            return Self::InProgress { scored, required };
        }
        Self::AllScored
    }

    pub fn can_submit(self) -> bool {
        matches!(self, Self::AllScored)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress { .. } => "in_progress",
            Self::AllScored => "all_scored",
            Self::Submitted => "submitted",
        }
    }
}
