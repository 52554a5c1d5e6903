//! Panel reviewer.
//!
//! # Invariants
//! - `name` is unique across reviewers after normalization.
//! - `submitted` is set by the reviewer and cleared only by an administrator.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ReviewerId = Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub id: ReviewerId,
    pub name: String,
    pub submitted: bool,
}

impl Reviewer {
    /// Creates a not-yet-submitted reviewer with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            submitted: false,
        }
    }
}

/// Normalizes a display name: trims and collapses inner whitespace runs.
///
/// Returns `None` when nothing is left.
pub fn normalize_display_name(name: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(name.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_display_name;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(
            normalize_display_name("  Reviewer \t 3 ").as_deref(),
            Some("Reviewer 3")
        );
    }

    #[test]
    fn normalize_rejects_blank_names() {
        assert_eq!(normalize_display_name(" \n "), None);
    }
}
