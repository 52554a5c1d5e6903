//! Five-step grade scale.
//!
//! # Invariants
//! - Level 1 is the best grade and maps to 100% of a criterion's max score.
//! - Each following level drops by ten percentage points, down to 60%.

use super::ScoringError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Ordinal grade a reviewer assigns to one criterion.
///
/// Serialized as its numeric level (`1..=5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GradeLevel {
    /// 수 (100%).
    Excellent,
    /// 우 (90%).
    VeryGood,
    /// 미 (80%).
    Good,
    /// 양 (70%).
    Fair,
    /// 가 (60%).
    Poor,
}

impl GradeLevel {
    /// All levels, best first.
    pub const ALL: [GradeLevel; 5] = [
        GradeLevel::Excellent,
        GradeLevel::VeryGood,
        GradeLevel::Good,
        GradeLevel::Fair,
        GradeLevel::Poor,
    ];

    /// Numeric level, `1` being the best.
    pub fn level(self) -> u8 {
        match self {
            Self::Excellent => 1,
            Self::VeryGood => 2,
            Self::Good => 3,
            Self::Fair => 4,
            Self::Poor => 5,
        }
    }

    /// Share of a criterion's max score this grade is worth, in whole percent.
    pub fn percentage(self) -> u32 {
        match self {
            Self::Excellent => 100,
            Self::VeryGood => 90,
            Self::Good => 80,
            Self::Fair => 70,
            Self::Poor => 60,
        }
    }

    /// Traditional panel label for this level.
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "수",
            Self::VeryGood => "우",
            Self::Good => "미",
            Self::Fair => "양",
            Self::Poor => "가",
        }
    }

    /// Parses either a numeric level (`"2"`) or a panel label (`"우"`).
    pub fn parse(value: &str) -> Result<Self, ScoringError> {
        let trimmed = value.trim();
        if let Some(grade) = Self::ALL.iter().find(|grade| grade.label() == trimmed) {
            return Ok(*grade);
        }
        match trimmed.parse::<u8>() {
            Ok(level) => Self::try_from(level),
            Err(_) => Err(ScoringError::UnrecognizedGrade(trimmed.to_string())),
        }
    }
}

impl TryFrom<u8> for GradeLevel {
    type Error = ScoringError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Excellent),
            2 => Ok(Self::VeryGood),
            3 => Ok(Self::Good),
            4 => Ok(Self::Fair),
            5 => Ok(Self::Poor),
            other => Err(ScoringError::InvalidGrade(other)),
        }
    }
}

impl From<GradeLevel> for u8 {
    fn from(value: GradeLevel) -> Self {
        value.level()
    }
}

impl Display for GradeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}
