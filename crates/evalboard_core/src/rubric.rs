//! Default qualitative rubric.
//!
//! Six categories, 23 criteria, 70 points in total. Installed into an empty
//! `criteria` table by `CriterionRepository::install_rubric`.

use crate::model::criterion::Criterion;

/// Sum of every default criterion's max score.
pub const DEFAULT_RUBRIC_TOTAL: f64 = 70.0;

const STRATEGY: &str = "Strategy and methodology";
const TECHNICAL: &str = "Technology and functionality";
const PERFORMANCE: &str = "Performance and quality";
const MANAGEMENT: &str = "Project management";
const SUPPORT: &str = "Project support";
const OTHER: &str = "Other";

// (id, category, sub-category, description, max score)
const DEFAULT_ITEMS: &[(&str, &str, &str, &str, f64)] = &[
    (
        "c1-1",
        STRATEGY,
        "Background and goals",
        "Specificity of background, purpose, scope and requirement identification",
        4.0,
    ),
    (
        "c1-2",
        STRATEGY,
        "Strategy and organisation",
        "Soundness of strategy, team structure and cooperation plan",
        2.0,
    ),
    (
        "c1-3",
        STRATEGY,
        "Methodology",
        "Suitability of the method and use of a standard framework",
        3.0,
    ),
    ("c1-4", STRATEGY, "Expected effects", "Expected effects and use of deliverables", 1.0),
    (
        "c2-1",
        TECHNICAL,
        "System requirements",
        "Compliance with required specs, extensibility and maintenance",
        4.0,
    ),
    (
        "c2-2",
        TECHNICAL,
        "Functional requirements",
        "Specificity of the implementation plan for functions and constraints",
        6.0,
    ),
    (
        "c2-3",
        TECHNICAL,
        "Security requirements",
        "Security implementation from design through verification",
        3.0,
    ),
    (
        "c2-4",
        TECHNICAL,
        "Data requirements",
        "Data migration plan, validation and error handling",
        3.0,
    ),
    (
        "c2-5",
        TECHNICAL,
        "Operations requirements",
        "Operating procedures and incident response",
        2.0,
    ),
    ("c2-6", TECHNICAL, "Constraints", "Implementation and test plan for constraints", 2.0),
    (
        "c3-1",
        PERFORMANCE,
        "Applied technology",
        "Extensibility and feasibility of applied technology",
        6.0,
    ),
    (
        "c3-2",
        PERFORMANCE,
        "Performance requirements",
        "Implementation, testing and tooling for performance targets",
        5.0,
    ),
    (
        "c3-3",
        PERFORMANCE,
        "Interface requirements",
        "System and user interface construction plan",
        3.0,
    ),
    (
        "c3-4",
        PERFORMANCE,
        "Quality requirements",
        "Quality checks across analysis, design, build and test",
        3.0,
    ),
    (
        "c4-1",
        MANAGEMENT,
        "Schedule management",
        "Adequacy of schedule and its link to deliverables",
        4.0,
    ),
    (
        "c4-2",
        MANAGEMENT,
        "Quality management",
        "Quality management plan and assurance certification",
        4.0,
    ),
    ("c4-3", MANAGEMENT, "Confidentiality", "Confidentiality controls and security measures", 3.0),
    (
        "c4-4",
        MANAGEMENT,
        "Risk and issue management",
        "Risk and issue identification, analysis and handling",
        2.0,
    ),
    (
        "c4-5",
        MANAGEMENT,
        "Development environment",
        "Development environment setup and licence review",
        2.0,
    ),
    ("c5-1", SUPPORT, "Trial operation", "Specificity of the trial operation plan", 2.0),
    (
        "c5-2",
        SUPPORT,
        "Technical support and training",
        "Scope and level of support and training plan",
        2.0,
    ),
    ("c5-3", SUPPORT, "Warranty", "Defect repair scope, procedure and maintenance plan", 2.0),
    ("c6-1", OTHER, "Other", "Sincerity, originality and additional support", 2.0),
];

/// Returns the default rubric in display order.
///
/// `order_num` is global across categories so that a plain sort by it
/// reproduces the sheet layout.
pub fn default_rubric() -> Vec<Criterion> {
    DEFAULT_ITEMS
        .iter()
        .enumerate()
        .map(
            |(position, (id, category, sub_category, name, max_score))| Criterion {
                id: (*id).to_string(),
                category: (*category).to_string(),
                sub_category: (*sub_category).to_string(),
                name: (*name).to_string(),
                max_score: *max_score,
                order_num: position as i64 + 1,
            },
        )
        .collect()
}
