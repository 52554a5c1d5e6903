//! Proposal under evaluation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProposalId = Uuid;

/// Competing proposal, ordered for display by `order_num`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub name: String,
    pub order_num: i64,
}

impl Proposal {
    /// Creates a proposal with a generated id.
    pub fn new(name: impl Into<String>, order_num: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            order_num,
        }
    }
}
