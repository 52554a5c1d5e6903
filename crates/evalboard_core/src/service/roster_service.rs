//! Administrator roster use-cases: proposals, reviewers, rubric, reset.
//!
//! # Responsibility
//! - Keep proposal and reviewer names normalized before they reach storage.
//! - Provide reviewer find-or-create login.
//! - Install the rubric and wipe panel data between evaluation rounds.
//!
//! # Invariants
//! - Names are trimmed with inner whitespace collapsed; blank names are
//!   rejected.
//! - Reviewer names stay unique.
//! - Deleting proposals or reviewers cascades to their scores and
//!   evaluations.

use crate::config::DEFAULT_STORAGE_RETRIES;
use crate::model::criterion::Criterion;
use crate::model::proposal::{Proposal, ProposalId};
use crate::model::reviewer::{normalize_display_name, Reviewer, ReviewerId};
use crate::repo::{with_retry, RepoError, ResetSummary, ScoringStore, StoreCounts};
use crate::rubric::default_rubric;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for roster use-cases.
#[derive(Debug)]
pub enum RosterServiceError {
    /// Name is blank after normalization.
    InvalidName(String),
    ProposalNotFound(ProposalId),
    ReviewerNotFound(ReviewerId),
    DuplicateReviewerName(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for RosterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "invalid name: `{value}`"),
            Self::ProposalNotFound(id) => write!(f, "proposal not found: {id}"),
            Self::ReviewerNotFound(id) => write!(f, "reviewer not found: {id}"),
            Self::DuplicateReviewerName(name) => {
                write!(f, "reviewer name already taken: `{name}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent roster state: {details}"),
        }
    }
}

impl Error for RosterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RosterServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProposalNotFound(id) => Self::ProposalNotFound(id),
            RepoError::ReviewerNotFound(id) => Self::ReviewerNotFound(id),
            RepoError::DuplicateReviewerName(name) => Self::DuplicateReviewerName(name),
            other => Self::Repo(other),
        }
    }
}

/// Result of a reviewer login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerLogin {
    pub reviewer: Reviewer,
    /// `true` when this login registered the reviewer.
    pub created: bool,
}

/// Roster service facade over repository implementations.
pub struct RosterService<R: ScoringStore> {
    store: R,
    retry_attempts: u32,
}

impl<R: ScoringStore> RosterService<R> {
    pub fn new(store: R) -> Self {
        Self {
            store,
            retry_attempts: DEFAULT_STORAGE_RETRIES,
        }
    }

    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Adds a proposal; `order_num` defaults to one past the current maximum.
    pub fn add_proposal(
        &self,
        name: &str,
        order_num: Option<i64>,
    ) -> Result<Proposal, RosterServiceError> {
        let name = normalize_name(name)?;
        let order_num = match order_num {
            Some(order_num) => order_num,
            None => self.store.next_order_num()?,
        };
        let proposal = Proposal::new(name, order_num);
        let id = with_retry(self.retry_attempts, "proposal_add", || {
            self.store.create_proposal(&proposal)
        })?;
        info!("event=proposal_add module=service status=ok proposal={id} order={order_num}");

        self.store
            .get_proposal(id)?
            .ok_or(RosterServiceError::InconsistentState(
                "created proposal not found in read-back",
            ))
    }

    pub fn rename_proposal(
        &self,
        id: ProposalId,
        name: &str,
    ) -> Result<Proposal, RosterServiceError> {
        let name = normalize_name(name)?;
        let mut proposal = self.require_proposal(id)?;
        proposal.name = name;
        self.store.update_proposal(&proposal)?;
        Ok(proposal)
    }

    pub fn reorder_proposal(
        &self,
        id: ProposalId,
        order_num: i64,
    ) -> Result<Proposal, RosterServiceError> {
        let mut proposal = self.require_proposal(id)?;
        proposal.order_num = order_num;
        self.store.update_proposal(&proposal)?;
        Ok(proposal)
    }

    /// Deletes a proposal together with every score and evaluation of it.
    pub fn delete_proposal(&self, id: ProposalId) -> Result<(), RosterServiceError> {
        with_retry(self.retry_attempts, "proposal_delete", || {
            self.store.delete_proposal(id)
        })?;
        info!("event=proposal_delete module=service status=ok proposal={id}");
        Ok(())
    }

    /// Proposals in display order.
    pub fn list_proposals(&self) -> Result<Vec<Proposal>, RosterServiceError> {
        Ok(self.store.list_proposals()?)
    }

    /// Finds the reviewer by normalized display name, registering it if new.
    pub fn login_reviewer(&self, name: &str) -> Result<ReviewerLogin, RosterServiceError> {
        let name = normalize_name(name)?;
        let (reviewer, created) = with_retry(self.retry_attempts, "reviewer_login", || {
            self.store.find_or_create_reviewer(&name)
        })?;
        info!(
            "event=reviewer_login module=service status=ok reviewer={} created={created}",
            reviewer.id
        );
        Ok(ReviewerLogin { reviewer, created })
    }

    pub fn rename_reviewer(
        &self,
        id: ReviewerId,
        name: &str,
    ) -> Result<Reviewer, RosterServiceError> {
        let name = normalize_name(name)?;
        if let Some(existing) = self.store.find_reviewer_by_name(&name)? {
            if existing.id != id {
                return Err(RosterServiceError::DuplicateReviewerName(name));
            }
        }
        self.store.rename_reviewer(id, &name)?;
        self.store
            .get_reviewer(id)?
            .ok_or(RosterServiceError::InconsistentState(
                "renamed reviewer not found in read-back",
            ))
    }

    /// Deletes a reviewer together with their scores and evaluations.
    pub fn delete_reviewer(&self, id: ReviewerId) -> Result<(), RosterServiceError> {
        with_retry(self.retry_attempts, "reviewer_delete", || {
            self.store.delete_reviewer(id)
        })?;
        info!("event=reviewer_delete module=service status=ok reviewer={id}");
        Ok(())
    }

    /// Looks a reviewer up by display name without registering it.
    pub fn find_reviewer(&self, name: &str) -> Result<Option<Reviewer>, RosterServiceError> {
        let name = normalize_name(name)?;
        Ok(self.store.find_reviewer_by_name(&name)?)
    }

    /// Reviewers in first-login order.
    pub fn list_reviewers(&self) -> Result<Vec<Reviewer>, RosterServiceError> {
        Ok(self.store.list_reviewers()?)
    }

    /// Installs `criteria` when no rubric exists yet; returns rows inserted.
    pub fn install_rubric(&self, criteria: &[Criterion]) -> Result<usize, RosterServiceError> {
        let inserted = with_retry(self.retry_attempts, "rubric_install", || {
            self.store.install_rubric(criteria)
        })?;
        info!(
            "event=rubric_install module=service status={} criteria={inserted}",
            if inserted == 0 { "skipped" } else { "ok" }
        );
        Ok(inserted)
    }

    pub fn install_default_rubric(&self) -> Result<usize, RosterServiceError> {
        self.install_rubric(&default_rubric())
    }

    pub fn list_criteria(&self) -> Result<Vec<Criterion>, RosterServiceError> {
        Ok(self.store.list_criteria()?)
    }

    /// Wipes every score, evaluation and reviewer; proposals and the rubric
    /// survive.
    pub fn reset_evaluations(&self) -> Result<ResetSummary, RosterServiceError> {
        let summary = with_retry(self.retry_attempts, "panel_reset", || self.store.reset_panel())?;
        info!(
            "event=panel_reset module=service status=ok scores={} evaluations={} reviewers={}",
            summary.scores, summary.evaluations, summary.reviewers
        );
        Ok(summary)
    }

    /// Row counts for the administrator status view.
    pub fn data_status(&self) -> Result<StoreCounts, RosterServiceError> {
        Ok(self.store.store_counts()?)
    }

    fn require_proposal(&self, id: ProposalId) -> Result<Proposal, RosterServiceError> {
        self.store
            .get_proposal(id)?
            .ok_or(RosterServiceError::ProposalNotFound(id))
    }
}

fn normalize_name(name: &str) -> Result<String, RosterServiceError> {
    normalize_display_name(name).ok_or_else(|| RosterServiceError::InvalidName(name.to_string()))
}
