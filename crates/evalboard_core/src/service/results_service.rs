//! Results and progress views over persisted evaluations.
//!
//! # Responsibility
//! - Feed saved totals into the trimmed aggregator and the ranker.
//! - Report per-reviewer and per-proposal completion for administrators.
//!
//! # Invariants
//! - Reads are plain snapshots; nothing here writes.
//! - Every call uses the one `ScoringPolicy` the service was built with.
//! - Unscored proposals rank with a zero mean and carry `unscored = true`.

use crate::config::ScoringPolicy;
use crate::model::proposal::{Proposal, ProposalId};
use crate::model::reviewer::{Reviewer, ReviewerId};
use crate::model::submission::SubmissionState;
use crate::repo::{RepoError, ScoringStore};
use crate::scoring::{aggregate_totals, rank_proposals, TrimmedAggregate};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ResultsServiceError {
    ProposalNotFound(ProposalId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for ResultsServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProposalNotFound(id) => write!(f, "proposal not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent results state: {details}"),
        }
    }
}

impl Error for ResultsServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ResultsServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProposalNotFound(id) => Self::ProposalNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Reviewer identity attached to each aggregated total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerRef {
    pub reviewer_id: ReviewerId,
    pub reviewer_name: String,
}

/// Aggregate figures for one proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalAggregate {
    pub proposal: Proposal,
    pub aggregate: TrimmedAggregate<ReviewerRef>,
}

/// One line of the ranked results board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub rank: usize,
    pub proposal: Proposal,
    pub reviewer_count: usize,
    pub raw_mean: f64,
    pub trimmed_mean: f64,
    /// Nobody has scored this proposal yet.
    pub unscored: bool,
    pub excluded_high: Option<ReviewerRef>,
    pub excluded_low: Option<ReviewerRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerProgress {
    pub reviewer: Reviewer,
    pub scored: usize,
    pub required: usize,
    /// 0..=100.
    pub completion_percent: f64,
    pub state: SubmissionState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalProgress {
    pub proposal: Proposal,
    pub reviewer_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressOverview {
    pub reviewers: Vec<ReviewerProgress>,
    pub proposals: Vec<ProposalProgress>,
}

/// Results service facade over repository implementations.
pub struct ResultsService<R: ScoringStore> {
    store: R,
    policy: ScoringPolicy,
}

impl<R: ScoringStore> ResultsService<R> {
    pub fn new(store: R, policy: ScoringPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    /// Raw mean, trimmed mean and exclusion flags for one proposal.
    pub fn aggregate_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> Result<ProposalAggregate, ResultsServiceError> {
        let proposal = self
            .store
            .get_proposal(proposal_id)?
            .ok_or(ResultsServiceError::ProposalNotFound(proposal_id))?;
        self.aggregate(proposal)
    }

    /// Every proposal, ranked by trimmed mean.
    pub fn results_board(&self) -> Result<Vec<ResultRow>, ResultsServiceError> {
        let mut aggregates = Vec::new();
        for proposal in self.store.list_proposals()? {
            aggregates.push(self.aggregate(proposal)?);
        }

        let means: Vec<(usize, f64)> = aggregates
            .iter()
            .enumerate()
            .map(|(index, entry)| (index, entry.aggregate.trimmed_mean))
            .collect();

        let mut rows = Vec::with_capacity(aggregates.len());
        for ranked in rank_proposals(&means, self.policy.ranking) {
            let entry = aggregates
                .get(ranked.key)
                .ok_or(ResultsServiceError::InconsistentState(
                    "ranked entry outside aggregate list",
                ))?;
            let aggregate = &entry.aggregate;
            rows.push(ResultRow {
                rank: ranked.rank,
                proposal: entry.proposal.clone(),
                reviewer_count: aggregate.entries.len(),
                raw_mean: aggregate.raw_mean,
                trimmed_mean: aggregate.trimmed_mean,
                unscored: aggregate.is_unscored(),
                excluded_high: aggregate.excluded_high().map(|e| e.key.clone()),
                excluded_low: aggregate.excluded_low().map(|e| e.key.clone()),
            });
        }
        Ok(rows)
    }

    /// Completion per reviewer and coverage per proposal.
    pub fn progress_overview(&self) -> Result<ProgressOverview, ResultsServiceError> {
        let proposals = self.store.list_proposals()?;
        let required = proposals.len();

        let mut reviewers = Vec::new();
        for reviewer in self.store.list_reviewers()? {
            let scored = self.store.count_evaluations_for_reviewer(reviewer.id)?;
            let completion_percent = if required == 0 {
                0.0
            } else {
                scored as f64 * 100.0 / required as f64
            };
            reviewers.push(ReviewerProgress {
                state: SubmissionState::derive(reviewer.submitted, scored, required),
                reviewer,
                scored,
                required,
                completion_percent,
            });
        }

        let mut coverage = Vec::with_capacity(required);
        for proposal in proposals {
            let reviewer_count = self.store.list_totals_for_proposal(proposal.id)?.len();
            coverage.push(ProposalProgress {
                proposal,
                reviewer_count,
            });
        }

        Ok(ProgressOverview {
            reviewers,
            proposals: coverage,
        })
    }

    fn aggregate(&self, proposal: Proposal) -> Result<ProposalAggregate, ResultsServiceError> {
        let totals: Vec<(ReviewerRef, f64)> = self
            .store
            .list_totals_for_proposal(proposal.id)?
            .into_iter()
            .map(|total| {
                (
                    ReviewerRef {
                        reviewer_id: total.reviewer_id,
                        reviewer_name: total.reviewer_name,
                    },
                    total.total_score,
                )
            })
            .collect();
        Ok(ProposalAggregate {
            proposal,
            aggregate: aggregate_totals(&totals, self.policy.mean_rounding),
        })
    }
}
