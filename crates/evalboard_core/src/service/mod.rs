//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod evaluation_service;
pub mod results_service;
pub mod roster_service;

pub use evaluation_service::{
    CategoryProgress, EvaluationService, EvaluationServiceError, SaveEvaluationRequest,
    TotalPreview,
};
pub use results_service::{
    ProgressOverview, ProposalAggregate, ProposalProgress, ResultRow, ResultsService,
    ResultsServiceError, ReviewerProgress, ReviewerRef,
};
pub use roster_service::{ReviewerLogin, RosterService, RosterServiceError};
