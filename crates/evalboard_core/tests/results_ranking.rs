use evalboard_core::db::open_db_in_memory;
use evalboard_core::model::criterion::Criterion;
use evalboard_core::repo::SqliteStore;
use evalboard_core::scoring::Exclusion;
use evalboard_core::{
    EvaluationService, GradeLevel, MeanRounding, Proposal, RankingPolicy, ResultsService,
    ResultsServiceError, Reviewer, RosterService, SaveEvaluationRequest, ScoringPolicy,
    SubmissionState,
};
use rusqlite::Connection;
use std::collections::BTreeMap;

struct Panel {
    proposals: Vec<Proposal>,
    reviewers: Vec<Reviewer>,
}

// One 100-point criterion makes every total equal to the grade percentage.
fn panel(conn: &Connection, proposals: &[&str], reviewers: &[&str]) -> Panel {
    let roster = RosterService::new(SqliteStore::try_new(conn).unwrap());
    roster
        .install_rubric(&[Criterion {
            id: "q1".to_string(),
            category: "Overall".to_string(),
            sub_category: "Overall".to_string(),
            name: "Overall quality".to_string(),
            max_score: 100.0,
            order_num: 1,
        }])
        .unwrap();
    Panel {
        proposals: proposals
            .iter()
            .map(|name| roster.add_proposal(name, None).unwrap())
            .collect(),
        reviewers: reviewers
            .iter()
            .map(|name| roster.login_reviewer(name).unwrap().reviewer)
            .collect(),
    }
}

fn grade(conn: &Connection, reviewer: &Reviewer, proposal: &Proposal, level: u8) {
    let mut grades = BTreeMap::new();
    grades.insert("q1".to_string(), GradeLevel::try_from(level).unwrap());
    EvaluationService::new(SqliteStore::try_new(conn).unwrap())
        .save_evaluation(&SaveEvaluationRequest {
            reviewer_id: reviewer.id,
            proposal_id: proposal.id,
            grades,
            comment: String::new(),
        })
        .unwrap();
}

fn results(conn: &Connection, policy: ScoringPolicy) -> ResultsService<SqliteStore<'_>> {
    ResultsService::new(SqliteStore::try_new(conn).unwrap(), policy)
}

#[test]
fn five_reviewers_drop_one_high_and_one_low() {
    let conn = open_db_in_memory().unwrap();
    let panel = panel(&conn, &["Alpha"], &["A", "B", "C", "D", "E"]);
    for (reviewer, level) in panel.reviewers.iter().zip(1..=5) {
        grade(&conn, reviewer, &panel.proposals[0], level);
    }

    let aggregate = results(&conn, ScoringPolicy::default())
        .aggregate_proposal(panel.proposals[0].id)
        .unwrap()
        .aggregate;
    assert_eq!(aggregate.raw_mean, 80.0);
    assert_eq!(aggregate.trimmed_mean, 80.0);
    assert_eq!(aggregate.excluded_high().unwrap().key.reviewer_name, "A");
    assert_eq!(aggregate.excluded_low().unwrap().key.reviewer_name, "E");
    assert_eq!(aggregate.trimmed_count(), 3);
}

#[test]
fn tied_extremes_exclude_only_the_first_holder() {
    let conn = open_db_in_memory().unwrap();
    let panel = panel(&conn, &["Alpha"], &["A", "B", "C"]);
    grade(&conn, &panel.reviewers[0], &panel.proposals[0], 5);
    grade(&conn, &panel.reviewers[1], &panel.proposals[0], 5);
    grade(&conn, &panel.reviewers[2], &panel.proposals[0], 1);

    let aggregate = results(&conn, ScoringPolicy::default())
        .aggregate_proposal(panel.proposals[0].id)
        .unwrap()
        .aggregate;
    let flags: Vec<Option<Exclusion>> = aggregate
        .entries
        .iter()
        .map(|entry| entry.exclusion)
        .collect();
    assert_eq!(flags, vec![Some(Exclusion::Low), None, Some(Exclusion::High)]);
    assert_eq!(aggregate.trimmed_mean, 60.0);
    assert_eq!(aggregate.raw_mean, 73.33);
}

#[test]
fn mean_rounding_policy_applies_to_both_means() {
    let conn = open_db_in_memory().unwrap();
    let panel = panel(&conn, &["Alpha"], &["A", "B", "C"]);
    grade(&conn, &panel.reviewers[0], &panel.proposals[0], 1);
    grade(&conn, &panel.reviewers[1], &panel.proposals[0], 1);
    grade(&conn, &panel.reviewers[2], &panel.proposals[0], 2);

    let rounded = results(&conn, ScoringPolicy::default())
        .aggregate_proposal(panel.proposals[0].id)
        .unwrap()
        .aggregate;
    assert_eq!(rounded.raw_mean, 96.67);
    assert_eq!(rounded.trimmed_mean, 100.0);

    let truncated = results(
        &conn,
        ScoringPolicy {
            mean_rounding: MeanRounding::Truncate,
            ranking: RankingPolicy::Sequential,
        },
    )
    .aggregate_proposal(panel.proposals[0].id)
    .unwrap()
    .aggregate;
    assert_eq!(truncated.raw_mean, 96.66);
}

#[test]
fn board_ranks_by_trimmed_mean_and_flags_unscored() {
    let conn = open_db_in_memory().unwrap();
    let panel = panel(&conn, &["Alpha", "Beta", "Gamma"], &["A", "B"]);
    grade(&conn, &panel.reviewers[0], &panel.proposals[0], 2);
    grade(&conn, &panel.reviewers[1], &panel.proposals[0], 3);
    grade(&conn, &panel.reviewers[0], &panel.proposals[1], 1);

    let board = results(&conn, ScoringPolicy::default())
        .results_board()
        .unwrap();
    let summary: Vec<(&str, usize, f64, bool)> = board
        .iter()
        .map(|row| {
            (
                row.proposal.name.as_str(),
                row.rank,
                row.trimmed_mean,
                row.unscored,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Beta", 1, 100.0, false),
            ("Alpha", 2, 85.0, false),
            ("Gamma", 3, 0.0, true),
        ]
    );
    assert_eq!(board[1].reviewer_count, 2);
    assert!(board[1].excluded_high.is_none());
}

#[test]
fn ranking_policy_decides_how_ties_are_numbered() {
    let conn = open_db_in_memory().unwrap();
    let panel = panel(&conn, &["Alpha", "Beta", "Gamma"], &["A"]);
    grade(&conn, &panel.reviewers[0], &panel.proposals[0], 2);
    grade(&conn, &panel.reviewers[0], &panel.proposals[1], 2);
    grade(&conn, &panel.reviewers[0], &panel.proposals[2], 4);

    let ranks = |policy: RankingPolicy| -> Vec<(String, usize)> {
        results(
            &conn,
            ScoringPolicy {
                mean_rounding: MeanRounding::Round,
                ranking: policy,
            },
        )
        .results_board()
        .unwrap()
        .into_iter()
        .map(|row| (row.proposal.name, row.rank))
        .collect()
    };

    assert_eq!(
        ranks(RankingPolicy::Sequential),
        vec![
            ("Alpha".to_string(), 1),
            ("Beta".to_string(), 2),
            ("Gamma".to_string(), 3)
        ]
    );
    assert_eq!(
        ranks(RankingPolicy::Shared),
        vec![
            ("Alpha".to_string(), 1),
            ("Beta".to_string(), 1),
            ("Gamma".to_string(), 3)
        ]
    );
}

#[test]
fn unknown_proposal_aggregate_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let ghost = Proposal::new("Ghost", 1);
    assert!(matches!(
        results(&conn, ScoringPolicy::default()).aggregate_proposal(ghost.id),
        Err(ResultsServiceError::ProposalNotFound(id)) if id == ghost.id
    ));
}

#[test]
fn progress_overview_reports_completion() {
    let conn = open_db_in_memory().unwrap();
    let panel = panel(&conn, &["Alpha", "Beta"], &["A", "B"]);
    grade(&conn, &panel.reviewers[0], &panel.proposals[0], 1);
    grade(&conn, &panel.reviewers[0], &panel.proposals[1], 1);
    grade(&conn, &panel.reviewers[1], &panel.proposals[0], 3);
    EvaluationService::new(SqliteStore::try_new(&conn).unwrap())
        .submit(panel.reviewers[0].id)
        .unwrap();

    let overview = results(&conn, ScoringPolicy::default())
        .progress_overview()
        .unwrap();
    let first = &overview.reviewers[0];
    assert_eq!((first.scored, first.required), (2, 2));
    assert_eq!(first.completion_percent, 100.0);
    assert_eq!(first.state, SubmissionState::Submitted);
    let second = &overview.reviewers[1];
    assert_eq!(second.completion_percent, 50.0);
    assert_eq!(
        second.state,
        SubmissionState::InProgress {
            scored: 1,
            required: 2
        }
    );

    let coverage: Vec<usize> = overview
        .proposals
        .iter()
        .map(|entry| entry.reviewer_count)
        .collect();
    assert_eq!(coverage, vec![2, 1]);

    let json = serde_json::to_value(&overview).unwrap();
    assert_eq!(json["reviewers"][0]["state"]["state"], "submitted");
}
