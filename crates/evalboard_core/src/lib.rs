//! Core domain logic for evalboard.
//!
//! Scoring rules, the submission lifecycle and the SQLite store live here;
//! front ends only call into `service`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rubric;
pub mod scoring;
pub mod service;

pub use config::{ConfigError, EngineConfig, ScoringPolicy};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::criterion::{Criterion, CriterionId};
pub use model::evaluation::{Evaluation, ReviewerTotal, Score};
pub use model::proposal::{Proposal, ProposalId};
pub use model::reviewer::{Reviewer, ReviewerId};
pub use model::submission::SubmissionState;
pub use repo::{RepoError, RepoResult, ScoringStore, SqliteStore};
pub use scoring::{GradeLevel, MeanRounding, RankingPolicy, ScoringError};
pub use service::{
    EvaluationService, EvaluationServiceError, ResultsService, ResultsServiceError,
    RosterService, RosterServiceError, SaveEvaluationRequest,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
