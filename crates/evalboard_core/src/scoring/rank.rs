//! Ranker: orders proposals by trimmed mean, best first.

use serde::{Deserialize, Serialize};

/// Rank assignment rule for equal means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Rank is the 1-based position; equal means still get distinct ranks.
    #[default]
    Sequential,
    /// Equal means share a rank and the following rank is skipped (1, 2, 2, 4).
    Shared,
}

impl RankingPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" => Some(Self::Sequential),
            "shared" | "tied" => Some(Self::Shared),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Shared => "shared",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry<K> {
    pub key: K,
    pub mean: f64,
    /// 1-based.
    pub rank: usize,
}

/// Sorts `means` descending and assigns ranks.
///
/// Equal means keep their input order, so callers pass proposals in display
/// order to get a deterministic listing.
pub fn rank_proposals<K: Clone>(means: &[(K, f64)], policy: RankingPolicy) -> Vec<RankedEntry<K>> {
    let mut sorted: Vec<&(K, f64)> = means.iter().collect();
    sorted.sort_by(|left, right| right.1.total_cmp(&left.1));

    let mut ranked: Vec<RankedEntry<K>> = Vec::with_capacity(sorted.len());
    for (position, (key, mean)) in sorted.into_iter().enumerate() {
        let rank = match (policy, ranked.last()) {
            (RankingPolicy::Shared, Some(previous)) if previous.mean == *mean => previous.rank,
            _ => position + 1,
        };
        ranked.push(RankedEntry {
            key: key.clone(),
            mean: *mean,
            rank,
        });
    }
    ranked
}
