//! Scores and evaluation summaries.

use crate::model::criterion::CriterionId;
use crate::model::proposal::ProposalId;
use crate::model::reviewer::ReviewerId;
use crate::scoring::GradeLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One grade for one (reviewer, proposal, criterion) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub criterion_id: CriterionId,
    pub grade: GradeLevel,
    /// Item score computed when the grade was saved.
    pub value: f64,
}

/// Summary of one reviewer's complete scoring of one proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub reviewer_id: ReviewerId,
    pub proposal_id: ProposalId,
    /// One-decimal sum of `scores` at save time.
    pub total_score: f64,
    pub comment: String,
    /// Epoch milliseconds of the last save.
    pub saved_at: i64,
    /// Sorted by criterion display order.
    pub scores: Vec<Score>,
}

impl Evaluation {
    /// Criterion → grade view used to re-open a scoring sheet.
    pub fn grade_map(&self) -> BTreeMap<CriterionId, GradeLevel> {
        self.scores
            .iter()
            .map(|score| (score.criterion_id.clone(), score.grade))
            .collect()
    }
}

/// Write model handed to the repository by the evaluation service.
///
/// `scores` must already cover every criterion and `total_score` must equal
/// their one-decimal sum.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationWrite {
    pub reviewer_id: ReviewerId,
    pub proposal_id: ProposalId,
    pub total_score: f64,
    pub comment: String,
    pub scores: Vec<Score>,
}

/// Per-reviewer total feeding aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerTotal {
    pub reviewer_id: ReviewerId,
    pub reviewer_name: String,
    pub total_score: f64,
}
