//! Total scorer: all criteria for one (reviewer, proposal) pair.
//!
//! Completeness of the criterion set is the caller's precondition; this
//! module only sums what it is given.

use super::grade::GradeLevel;
use super::item::score_item;
use super::rounding::round_half_up;
use super::ScoringResult;

/// Sums already-computed item scores and rounds to one decimal.
pub fn sum_item_scores<I>(scores: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let sum: f64 = scores.into_iter().sum();
    round_half_up(sum, 1)
}

/// Scores every `(max_score, grade)` pair and returns their one-decimal total.
pub fn total_score(items: &[(f64, GradeLevel)]) -> ScoringResult<f64> {
    let mut scores = Vec::with_capacity(items.len());
    for (max_score, grade) in items {
        scores.push(score_item(*max_score, *grade)?);
    }
    Ok(sum_item_scores(scores))
}

#[cfg(test)]
mod tests {
    use super::{sum_item_scores, total_score};
    use crate::scoring::GradeLevel;

    #[test]
    fn total_reports_one_decimal_without_float_noise() {
        let items = [
            (3.0, GradeLevel::VeryGood),
            (3.0, GradeLevel::VeryGood),
            (3.0, GradeLevel::VeryGood),
        ];
        assert_eq!(total_score(&items).unwrap(), 8.1);
    }

    #[test]
    fn total_of_nothing_is_zero() {
        assert_eq!(total_score(&[]).unwrap(), 0.0);
        assert_eq!(sum_item_scores(Vec::new()), 0.0);
    }

    #[test]
    fn total_propagates_invalid_max_score() {
        assert!(total_score(&[(4.0, GradeLevel::Good), (0.0, GradeLevel::Good)]).is_err());
    }
}
