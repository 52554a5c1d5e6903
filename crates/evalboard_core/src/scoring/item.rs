//! Item scorer: one criterion, one grade.

use super::grade::GradeLevel;
use super::rounding::round_half_up;
use super::{ScoringError, ScoringResult};

/// Scores one criterion graded at `grade`.
///
/// Returns `max_score * percentage(grade)` rounded half-up to one decimal.
///
/// # Errors
/// - `InvalidMaxScore` when `max_score` is not a positive finite number.
pub fn score_item(max_score: f64, grade: GradeLevel) -> ScoringResult<f64> {
    validate_max_score(max_score)?;
    let raw = max_score * f64::from(grade.percentage()) / 100.0;
    Ok(round_half_up(raw, 1))
}

/// Item score for every grade level, best first.
///
/// Scoring sheets use this as the per-criterion column header row.
pub fn grade_scores(max_score: f64) -> ScoringResult<[(GradeLevel, f64); 5]> {
    validate_max_score(max_score)?;
    let mut row = [(GradeLevel::Excellent, 0.0); 5];
    for (slot, grade) in row.iter_mut().zip(GradeLevel::ALL) {
        *slot = (grade, score_item(max_score, grade)?);
    }
    Ok(row)
}

fn validate_max_score(max_score: f64) -> ScoringResult<()> {
    if max_score.is_finite() && max_score > 0.0 {
        Ok(())
    } else {
        Err(ScoringError::InvalidMaxScore(max_score))
    }
}

#[cfg(test)]
mod tests {
    use super::{grade_scores, score_item};
    use crate::scoring::{GradeLevel, ScoringError};

    #[test]
    fn item_score_never_exceeds_max_and_equals_it_only_at_top_grade() {
        for max in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 10.0, 2.5] {
            for grade in GradeLevel::ALL {
                let score = score_item(max, grade).unwrap();
                assert!(score <= max, "{score} > {max} at {grade}");
                assert_eq!(score == max, grade == GradeLevel::Excellent);
            }
        }
    }

    #[test]
    fn item_score_rounds_to_one_decimal() {
        assert_eq!(score_item(3.0, GradeLevel::VeryGood).unwrap(), 2.7);
        assert_eq!(score_item(6.0, GradeLevel::Fair).unwrap(), 4.2);
        assert_eq!(score_item(2.5, GradeLevel::VeryGood).unwrap(), 2.3);
        assert_eq!(score_item(1.0, GradeLevel::Poor).unwrap(), 0.6);
    }

    #[test]
    fn non_positive_max_score_is_rejected() {
        assert_eq!(
            score_item(0.0, GradeLevel::Good),
            Err(ScoringError::InvalidMaxScore(0.0))
        );
        assert!(score_item(-2.0, GradeLevel::Good).is_err());
        assert!(score_item(f64::NAN, GradeLevel::Good).is_err());
    }

    #[test]
    fn grade_scores_lists_every_level() {
        let row = grade_scores(4.0).unwrap();
        let values: Vec<f64> = row.iter().map(|(_, score)| *score).collect();
        assert_eq!(values, vec![4.0, 3.6, 3.2, 2.8, 2.4]);
    }
}
