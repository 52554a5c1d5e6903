//! Scoring and aggregation engine.
//!
//! # Responsibility
//! - Map grade levels to item scores and item scores to per-reviewer totals.
//! - Combine per-reviewer totals into raw and trimmed means.
//! - Rank proposals by trimmed mean.
//!
//! # Invariants
//! - Every function here is pure and synchronous; no storage access.
//! - Item scores and totals are kept at one decimal, means at two decimals.
//! - Grade percentages live only in `grade::GradeLevel::percentage`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod aggregate;
pub mod grade;
pub mod item;
pub mod rank;
pub(crate) mod rounding;
pub mod total;

pub use aggregate::{aggregate_totals, Exclusion, MeanRounding, TotalEntry, TrimmedAggregate};
pub use grade::GradeLevel;
pub use item::{grade_scores, score_item};
pub use rank::{rank_proposals, RankedEntry, RankingPolicy};
pub use total::{sum_item_scores, total_score};

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Input errors raised by the pure scoring functions.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// Raw grade level outside `1..=5`.
    InvalidGrade(u8),
    /// Text that is neither a level number nor a panel label.
    UnrecognizedGrade(String),
    /// Criterion maximum score is not a positive finite number.
    InvalidMaxScore(f64),
}

impl Display for ScoringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGrade(level) => {
                write!(f, "invalid grade level {level}; expected 1..=5")
            }
            Self::UnrecognizedGrade(value) => {
                write!(f, "unrecognized grade `{value}`; expected 1..=5 or 수/우/미/양/가")
            }
            Self::InvalidMaxScore(value) => {
                write!(f, "invalid max score {value}; expected a positive number")
            }
        }
    }
}

impl Error for ScoringError {}
