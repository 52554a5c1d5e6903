//! Trimmed aggregator over per-reviewer totals of one proposal.
//!
//! # Invariants
//! - Raw mean always covers the full list.
//! - Trimming needs at least three totals and a non-zero spread.
//! - At most one entry is marked excluded-high and one excluded-low; ties go
//!   to the earliest entry in input order.
//! - Both means use the same `MeanRounding`.

use super::rounding::{round_half_up, truncate};
use serde::{Deserialize, Serialize};

const MEAN_DECIMALS: i32 = 2;
const MIN_TRIM_COUNT: usize = 3;

/// How two-decimal means are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanRounding {
    /// Round half-up at the second decimal.
    #[default]
    Round,
    /// Drop digits beyond the second decimal.
    Truncate,
}

impl MeanRounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Round => round_half_up(value, MEAN_DECIMALS),
            Self::Truncate => truncate(value, MEAN_DECIMALS),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "round" => Some(Self::Round),
            "truncate" | "trunc" => Some(Self::Truncate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Truncate => "truncate",
        }
    }
}

/// Why an entry was left out of the trimmed mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    High,
    Low,
}

/// One reviewer's total with its trimming flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalEntry<K> {
    pub key: K,
    pub total: f64,
    pub exclusion: Option<Exclusion>,
}

/// Aggregate figures for one proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimmedAggregate<K> {
    pub raw_mean: f64,
    pub trimmed_mean: f64,
    /// Entries in input order.
    pub entries: Vec<TotalEntry<K>>,
}

impl<K> TrimmedAggregate<K> {
    /// `true` when nobody has scored the proposal yet.
    pub fn is_unscored(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn excluded_high(&self) -> Option<&TotalEntry<K>> {
        self.entries
            .iter()
            .find(|entry| entry.exclusion == Some(Exclusion::High))
    }

    pub fn excluded_low(&self) -> Option<&TotalEntry<K>> {
        self.entries
            .iter()
            .find(|entry| entry.exclusion == Some(Exclusion::Low))
    }

    /// Number of totals that fed the trimmed mean.
    pub fn trimmed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.exclusion.is_none())
            .count()
    }
}

/// Computes raw and trimmed means for one proposal's reviewer totals.
///
/// Reviewers who have not scored the proposal must be absent from `totals`,
/// not passed as zero. An empty slice yields zero means and no entries.
pub fn aggregate_totals<K: Clone>(
    totals: &[(K, f64)],
    rounding: MeanRounding,
) -> TrimmedAggregate<K> {
    let mut entries: Vec<TotalEntry<K>> = totals
        .iter()
        .map(|(key, total)| TotalEntry {
            key: key.clone(),
            total: *total,
            exclusion: None,
        })
        .collect();

    if entries.is_empty() {
        return TrimmedAggregate {
            raw_mean: 0.0,
            trimmed_mean: 0.0,
            entries,
        };
    }

    let raw_mean = rounding.apply(mean(entries.iter().map(|entry| entry.total)));
    if entries.len() < MIN_TRIM_COUNT {
        return TrimmedAggregate {
            raw_mean,
            trimmed_mean: raw_mean,
            entries,
        };
    }

    let (high, low) = extreme_positions(&entries);
    if entries[high].total == entries[low].total {
        return TrimmedAggregate {
            raw_mean,
            trimmed_mean: raw_mean,
            entries,
        };
    }

    entries[high].exclusion = Some(Exclusion::High);
    entries[low].exclusion = Some(Exclusion::Low);
    let trimmed_mean = rounding.apply(mean(
        entries
            .iter()
            .filter(|entry| entry.exclusion.is_none())
            .map(|entry| entry.total),
    ));

    TrimmedAggregate {
        raw_mean,
        trimmed_mean,
        entries,
    }
}

fn extreme_positions<K>(entries: &[TotalEntry<K>]) -> (usize, usize) {
    let mut high = 0;
    let mut low = 0;
    for (index, entry) in entries.iter().enumerate().skip(1) {
        if entry.total > entries[high].total {
            high = index;
        }
        if entry.total < entries[low].total {
            low = index;
        }
    }
    (high, low)
}

fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut count = 0_usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::{aggregate_totals, Exclusion, MeanRounding};

    fn keyed(values: &[f64]) -> Vec<(usize, f64)> {
        values.iter().copied().enumerate().collect()
    }

    #[test]
    fn empty_list_is_a_valid_zero_state() {
        let result = aggregate_totals::<usize>(&[], MeanRounding::Round);
        assert_eq!(result.raw_mean, 0.0);
        assert_eq!(result.trimmed_mean, 0.0);
        assert!(result.is_unscored());
    }

    #[test]
    fn one_or_two_totals_are_not_trimmed() {
        for values in [vec![50.0], vec![50.0, 60.0], vec![61.3, 70.8]] {
            let result = aggregate_totals(&keyed(&values), MeanRounding::Round);
            assert_eq!(result.trimmed_mean, result.raw_mean);
            assert!(result.entries.iter().all(|entry| entry.exclusion.is_none()));
        }
    }

    #[test]
    fn five_spread_totals_drop_one_high_and_one_low() {
        let result = aggregate_totals(
            &keyed(&[50.0, 60.0, 70.0, 80.0, 90.0]),
            MeanRounding::Round,
        );
        assert_eq!(result.trimmed_mean, 70.0);
        assert_eq!(result.raw_mean, 70.0);
        assert_eq!(result.excluded_low().unwrap().key, 0);
        assert_eq!(result.excluded_high().unwrap().key, 4);
        assert_eq!(result.trimmed_count(), 3);
    }

    #[test]
    fn identical_totals_exclude_nothing() {
        let result = aggregate_totals(&keyed(&[70.0, 70.0, 70.0]), MeanRounding::Round);
        assert_eq!(result.trimmed_mean, 70.0);
        assert_eq!(result.raw_mean, 70.0);
        assert!(result.entries.iter().all(|entry| entry.exclusion.is_none()));
    }

    #[test]
    fn tied_minimum_marks_only_the_first_holder() {
        let result = aggregate_totals(&keyed(&[50.0, 50.0, 90.0]), MeanRounding::Round);
        let flags: Vec<Option<Exclusion>> =
            result.entries.iter().map(|entry| entry.exclusion).collect();
        assert_eq!(flags, vec![Some(Exclusion::Low), None, Some(Exclusion::High)]);
        assert_eq!(result.trimmed_mean, 50.0);
        assert_eq!(result.raw_mean, 63.33);
    }

    #[test]
    fn rounding_rule_applies_to_both_means() {
        let values = keyed(&[60.1, 60.2, 60.2, 90.0]);
        let rounded = aggregate_totals(&values, MeanRounding::Round);
        let truncated = aggregate_totals(&values, MeanRounding::Truncate);
        // raw: 270.5 / 4 = 67.625
        assert_eq!(rounded.raw_mean, 67.63);
        assert_eq!(truncated.raw_mean, 67.62);
        // trimmed: (60.2 + 60.2) / 2
        assert_eq!(rounded.trimmed_mean, 60.2);
        assert_eq!(truncated.trimmed_mean, 60.2);
    }

    #[test]
    fn three_way_mean_is_expressed_to_two_decimals() {
        let result = aggregate_totals(&keyed(&[85.0, 90.0, 78.0]), MeanRounding::Round);
        assert_eq!(result.raw_mean, 84.33);
        assert_eq!(result.trimmed_mean, 85.0);
    }

    #[test]
    fn mean_rounding_parses_config_values() {
        assert_eq!(MeanRounding::parse("ROUND"), Some(MeanRounding::Round));
        assert_eq!(MeanRounding::parse("truncate"), Some(MeanRounding::Truncate));
        assert_eq!(MeanRounding::parse("floor"), None);
    }
}
