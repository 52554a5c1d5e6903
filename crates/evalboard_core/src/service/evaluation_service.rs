//! Reviewer evaluation use-cases.
//!
//! # Responsibility
//! - Turn a reviewer's grade map into persisted scores and a total.
//! - Gate every write on the reviewer's submission state.
//! - Drive the `submit` / `unlock` lifecycle transitions.
//!
//! # Invariants
//! - A save is either fully applied or not applied at all; rejected saves
//!   write nothing.
//! - Saves require exactly one grade per installed criterion.
//! - Stored item scores and totals are computed here, never taken from input.
//! - A submitted reviewer cannot save or edit comments until unlocked.

use crate::config::DEFAULT_STORAGE_RETRIES;
use crate::model::criterion::{Criterion, CriterionId};
use crate::model::evaluation::{Evaluation, EvaluationWrite, Score};
use crate::model::proposal::ProposalId;
use crate::model::reviewer::{Reviewer, ReviewerId};
use crate::model::submission::SubmissionState;
use crate::repo::{with_retry, RepoError, ScoringStore};
use crate::scoring::rounding::round_half_up;
use crate::scoring::{score_item, sum_item_scores, GradeLevel, ScoringError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for evaluation use-cases.
#[derive(Debug)]
pub enum EvaluationServiceError {
    /// Grade or max score rejected by the scoring engine.
    Scoring(ScoringError),
    /// Grade map does not cover these criteria.
    IncompleteEvaluation { missing: Vec<CriterionId> },
    /// Reviewer has submitted; writes are frozen.
    SubmissionLocked(ReviewerId),
    /// Submit attempted before every proposal was scored.
    NotAllScored { scored: usize, required: usize },
    ProposalNotFound(ProposalId),
    ReviewerNotFound(ReviewerId),
    CriterionNotFound(CriterionId),
    EvaluationNotFound {
        reviewer_id: ReviewerId,
        proposal_id: ProposalId,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for EvaluationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scoring(err) => write!(f, "{err}"),
            Self::IncompleteEvaluation { missing } => {
                write!(f, "evaluation is missing grades for: {}", missing.join(", "))
            }
            Self::SubmissionLocked(id) => {
                write!(f, "reviewer {id} has submitted; scores are locked")
            }
            Self::NotAllScored { scored, required } => write!(
                f,
                "cannot submit: {scored} of {required} proposals scored"
            ),
            Self::ProposalNotFound(id) => write!(f, "proposal not found: {id}"),
            Self::ReviewerNotFound(id) => write!(f, "reviewer not found: {id}"),
            Self::CriterionNotFound(id) => write!(f, "criterion not found: `{id}`"),
            Self::EvaluationNotFound {
                reviewer_id,
                proposal_id,
            } => write!(
                f,
                "no saved evaluation for reviewer {reviewer_id} on proposal {proposal_id}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent evaluation state: {details}")
            }
        }
    }
}

impl Error for EvaluationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Scoring(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EvaluationServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProposalNotFound(id) => Self::ProposalNotFound(id),
            RepoError::ReviewerNotFound(id) => Self::ReviewerNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ScoringError> for EvaluationServiceError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

/// Full grade sheet for one (reviewer, proposal) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEvaluationRequest {
    pub reviewer_id: ReviewerId,
    pub proposal_id: ProposalId,
    pub grades: BTreeMap<CriterionId, GradeLevel>,
    #[serde(default)]
    pub comment: String,
}

/// Running subtotal of one rubric category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProgress {
    pub category: String,
    pub score: f64,
    pub max_score: f64,
    pub graded: usize,
    pub total: usize,
}

/// Live total for a possibly partial grade map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalPreview {
    pub total: f64,
    pub scored: usize,
    pub required: usize,
    pub complete: bool,
    /// Categories in rubric order.
    pub categories: Vec<CategoryProgress>,
}

/// Evaluation service facade over repository implementations.
pub struct EvaluationService<R: ScoringStore> {
    store: R,
    retry_attempts: u32,
}

impl<R: ScoringStore> EvaluationService<R> {
    /// Creates a service using the provided store.
    pub fn new(store: R) -> Self {
        Self {
            store,
            retry_attempts: DEFAULT_STORAGE_RETRIES,
        }
    }

    /// Overrides how many times transient storage failures are attempted.
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Computes the running total of `grades` without persisting anything.
    ///
    /// Partial maps are fine here; unknown criterion ids are not.
    pub fn preview_total(
        &self,
        grades: &BTreeMap<CriterionId, GradeLevel>,
    ) -> Result<TotalPreview, EvaluationServiceError> {
        let criteria = self.store.list_criteria()?;
        reject_unknown_criteria(&criteria, grades)?;

        let mut categories: Vec<CategoryProgress> = Vec::new();
        let mut item_scores = Vec::with_capacity(grades.len());
        for criterion in &criteria {
            let score = match grades.get(&criterion.id) {
                Some(grade) => Some(score_item(criterion.max_score, *grade)?),
                None => None,
            };
            if let Some(value) = score {
                item_scores.push(value);
            }

            let position = match categories
                .iter()
                .position(|entry| entry.category == criterion.category)
            {
                Some(position) => position,
                None => {
                    categories.push(CategoryProgress {
                        category: criterion.category.clone(),
                        score: 0.0,
                        max_score: 0.0,
                        graded: 0,
                        total: 0,
                    });
                    categories.len() - 1
                }
            };
            let entry = &mut categories[position];
            entry.max_score += criterion.max_score;
            entry.total += 1;
            if let Some(value) = score {
                entry.score += value;
                entry.graded += 1;
            }
        }
        for entry in &mut categories {
            entry.score = round_half_up(entry.score, 1);
            entry.max_score = round_half_up(entry.max_score, 1);
        }

        Ok(TotalPreview {
            total: sum_item_scores(item_scores.iter().copied()),
            scored: item_scores.len(),
            required: criteria.len(),
            complete: item_scores.len() == criteria.len(),
            categories,
        })
    }

    /// Validates, scores and persists one complete grade sheet.
    ///
    /// Replaces any previous save for the same pair. Returns the stored
    /// evaluation as read back from storage.
    ///
    /// # Errors
    /// - `ReviewerNotFound` / `ProposalNotFound` for unknown ids.
    /// - `SubmissionLocked` when the reviewer has submitted.
    /// - `CriterionNotFound` for a grade keyed by an unknown criterion.
    /// - `IncompleteEvaluation` when any criterion is left ungraded.
    pub fn save_evaluation(
        &self,
        request: &SaveEvaluationRequest,
    ) -> Result<Evaluation, EvaluationServiceError> {
        let reviewer = self.require_reviewer(request.reviewer_id)?;
        ensure_editable(&reviewer)?;
        if self.store.get_proposal(request.proposal_id)?.is_none() {
            return Err(EvaluationServiceError::ProposalNotFound(request.proposal_id));
        }

        let criteria = self.store.list_criteria()?;
        reject_unknown_criteria(&criteria, &request.grades)?;
        let missing: Vec<CriterionId> = criteria
            .iter()
            .filter(|criterion| !request.grades.contains_key(&criterion.id))
            .map(|criterion| criterion.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(EvaluationServiceError::IncompleteEvaluation { missing });
        }

        let mut scores = Vec::with_capacity(criteria.len());
        for criterion in &criteria {
            let grade = request.grades[&criterion.id];
            scores.push(Score {
                criterion_id: criterion.id.clone(),
                grade,
                value: score_item(criterion.max_score, grade)?,
            });
        }
        let write = EvaluationWrite {
            reviewer_id: request.reviewer_id,
            proposal_id: request.proposal_id,
            total_score: sum_item_scores(scores.iter().map(|score| score.value)),
            comment: request.comment.clone(),
            scores,
        };

        with_retry(self.retry_attempts, "evaluation_save", || {
            self.store.replace_evaluation(&write)
        })?;
        info!(
            "event=evaluation_save module=service status=ok reviewer={} proposal={} criteria={} total={:.1}",
            write.reviewer_id,
            write.proposal_id,
            write.scores.len(),
            write.total_score
        );

        self.store
            .get_evaluation(write.reviewer_id, write.proposal_id)?
            .ok_or(EvaluationServiceError::InconsistentState(
                "saved evaluation not found in read-back",
            ))
    }

    /// Gets the saved evaluation of one pair, if any.
    pub fn get_evaluation(
        &self,
        reviewer_id: ReviewerId,
        proposal_id: ProposalId,
    ) -> Result<Option<Evaluation>, EvaluationServiceError> {
        Ok(self.store.get_evaluation(reviewer_id, proposal_id)?)
    }

    /// Replaces the comment of an already saved evaluation.
    pub fn update_comment(
        &self,
        reviewer_id: ReviewerId,
        proposal_id: ProposalId,
        comment: &str,
    ) -> Result<Evaluation, EvaluationServiceError> {
        let reviewer = self.require_reviewer(reviewer_id)?;
        ensure_editable(&reviewer)?;

        let updated = with_retry(self.retry_attempts, "comment_update", || {
            self.store.update_comment(reviewer_id, proposal_id, comment)
        })?;
        if !updated {
            return Err(EvaluationServiceError::EvaluationNotFound {
                reviewer_id,
                proposal_id,
            });
        }

        self.store
            .get_evaluation(reviewer_id, proposal_id)?
            .ok_or(EvaluationServiceError::InconsistentState(
                "commented evaluation not found in read-back",
            ))
    }

    /// Derives the reviewer's current lifecycle state.
    pub fn submission_state(
        &self,
        reviewer_id: ReviewerId,
    ) -> Result<SubmissionState, EvaluationServiceError> {
        let reviewer = self.require_reviewer(reviewer_id)?;
        self.derive_state(&reviewer)
    }

    /// Freezes the reviewer's evaluations.
    ///
    /// # Errors
    /// - `SubmissionLocked` when already submitted.
    /// - `NotAllScored` unless every proposal has a saved evaluation.
    pub fn submit(
        &self,
        reviewer_id: ReviewerId,
    ) -> Result<SubmissionState, EvaluationServiceError> {
        let reviewer = self.require_reviewer(reviewer_id)?;
        if reviewer.submitted {
            return Err(EvaluationServiceError::SubmissionLocked(reviewer_id));
        }

        let applied = with_retry(self.retry_attempts, "reviewer_submit", || {
            self.store.submit_if_complete(reviewer_id)
        })?;
        if applied {
            info!("event=reviewer_submit module=service status=ok reviewer={reviewer_id}");
            return Ok(SubmissionState::Submitted);
        }

        // The guarded write saw a different state; report what is stored now.
        let reviewer = self.require_reviewer(reviewer_id)?;
        let state = self.derive_state(&reviewer)?;
        warn!(
            "event=reviewer_submit module=service status=rejected reviewer={reviewer_id} state={}",
            state.as_str()
        );
        if state.can_submit() {
            return Err(EvaluationServiceError::InconsistentState(
                "complete reviewer rejected by submit guard",
            ));
        }
        Err(match state {
            SubmissionState::Submitted => EvaluationServiceError::SubmissionLocked(reviewer_id),
            SubmissionState::InProgress { scored, required } => {
                EvaluationServiceError::NotAllScored { scored, required }
            }
            SubmissionState::NotStarted | SubmissionState::AllScored => {
                EvaluationServiceError::NotAllScored {
                    scored: 0,
                    required: self.store.count_proposals()?,
                }
            }
        })
    }

    /// Administrator action: re-opens a reviewer's evaluations.
    ///
    /// Unlocking a reviewer who never submitted is a no-op.
    pub fn unlock(
        &self,
        reviewer_id: ReviewerId,
    ) -> Result<SubmissionState, EvaluationServiceError> {
        let reviewer = self.require_reviewer(reviewer_id)?;
        if !reviewer.submitted {
            warn!("event=reviewer_unlock module=service status=noop reviewer={reviewer_id}");
            return self.derive_state(&reviewer);
        }

        with_retry(self.retry_attempts, "reviewer_unlock", || {
            self.store.set_submitted(reviewer_id, false)
        })?;
        info!("event=reviewer_unlock module=service status=ok reviewer={reviewer_id}");

        let reopened = Reviewer {
            submitted: false,
            ..reviewer
        };
        self.derive_state(&reopened)
    }

    fn require_reviewer(
        &self,
        reviewer_id: ReviewerId,
    ) -> Result<Reviewer, EvaluationServiceError> {
        self.store
            .get_reviewer(reviewer_id)?
            .ok_or(EvaluationServiceError::ReviewerNotFound(reviewer_id))
    }

    fn derive_state(&self, reviewer: &Reviewer) -> Result<SubmissionState, EvaluationServiceError> {
        let scored = self.store.count_evaluations_for_reviewer(reviewer.id)?;
        let required = self.store.count_proposals()?;
        Ok(SubmissionState::derive(reviewer.submitted, scored, required))
    }
}

fn ensure_editable(reviewer: &Reviewer) -> Result<(), EvaluationServiceError> {
    if reviewer.submitted {
        warn!(
            "event=evaluation_write module=service status=rejected reason=submission_locked reviewer={}",
            reviewer.id
        );
        return Err(EvaluationServiceError::SubmissionLocked(reviewer.id));
    }
    Ok(())
}

fn reject_unknown_criteria(
    criteria: &[Criterion],
    grades: &BTreeMap<CriterionId, GradeLevel>,
) -> Result<(), EvaluationServiceError> {
    for criterion_id in grades.keys() {
        if !criteria.iter().any(|criterion| &criterion.id == criterion_id) {
            return Err(EvaluationServiceError::CriterionNotFound(criterion_id.clone()));
        }
    }
    Ok(())
}
