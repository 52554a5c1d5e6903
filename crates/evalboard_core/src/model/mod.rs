//! Domain model for proposal evaluation.
//!
//! # Responsibility
//! - Define the records persisted by the repository layer.
//! - Keep validation rules next to the types they guard.
//!
//! # Invariants
//! - Proposals and reviewers are identified by stable UUIDs.
//! - Criteria are keyed by stable rubric ids such as `c2-3`.
//! - A score's numeric value is fixed at write time, never re-derived.

pub mod criterion;
pub mod evaluation;
pub mod proposal;
pub mod reviewer;
pub mod submission;
