//! Rubric criterion.
//!
//! # Invariants
//! - `id` is non-blank and stable across rubric installs.
//! - `max_score` is positive and finite.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CriterionId = String;

/// One rubric line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    /// Top-level grouping, e.g. "Strategy and methodology".
    pub category: String,
    pub sub_category: String,
    pub name: String,
    pub max_score: f64,
    pub order_num: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CriterionValidationError {
    EmptyId,
    NonPositiveMaxScore { id: CriterionId, max_score: f64 },
}

impl Display for CriterionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "criterion id must not be blank"),
            Self::NonPositiveMaxScore { id, max_score } => {
                write!(f, "criterion `{id}` has non-positive max score {max_score}")
            }
        }
    }
}

impl Error for CriterionValidationError {}

impl Criterion {
    pub fn validate(&self) -> Result<(), CriterionValidationError> {
        if self.id.trim().is_empty() {
            return Err(CriterionValidationError::EmptyId);
        }
        if !self.max_score.is_finite() || self.max_score <= 0.0 {
            return Err(CriterionValidationError::NonPositiveMaxScore {
                id: self.id.clone(),
                max_score: self.max_score,
            });
        }
        Ok(())
    }
}
