use evalboard_core::db::open_db_in_memory;
use evalboard_core::repo::{ReviewerRepository, SqliteStore};
use evalboard_core::rubric::{default_rubric, DEFAULT_RUBRIC_TOTAL};
use evalboard_core::{
    EvaluationService, GradeLevel, Proposal, Reviewer, RosterService, RosterServiceError,
    SaveEvaluationRequest,
};
use rusqlite::Connection;

fn roster(conn: &Connection) -> RosterService<SqliteStore<'_>> {
    RosterService::new(SqliteStore::try_new(conn).unwrap())
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn score_everything(
    conn: &Connection,
    reviewer: &Reviewer,
    proposal: &Proposal,
    grade: GradeLevel,
) {
    let roster = roster(conn);
    let grades = roster
        .list_criteria()
        .unwrap()
        .into_iter()
        .map(|criterion| (criterion.id, grade))
        .collect();
    EvaluationService::new(SqliteStore::try_new(conn).unwrap())
        .save_evaluation(&SaveEvaluationRequest {
            reviewer_id: reviewer.id,
            proposal_id: proposal.id,
            grades,
            comment: String::new(),
        })
        .unwrap();
}

#[test]
fn default_rubric_installs_once() {
    let conn = open_db_in_memory().unwrap();
    let roster = roster(&conn);

    assert_eq!(roster.install_default_rubric().unwrap(), 23);
    assert_eq!(roster.install_default_rubric().unwrap(), 0);

    let criteria = roster.list_criteria().unwrap();
    assert_eq!(criteria.len(), default_rubric().len());
    assert_eq!(criteria[0].id, "c1-1");
    let total: f64 = criteria.iter().map(|criterion| criterion.max_score).sum();
    assert!((total - DEFAULT_RUBRIC_TOTAL).abs() < 1e-9);
}

#[test]
fn proposals_get_the_next_display_order() {
    let conn = open_db_in_memory().unwrap();
    let roster = roster(&conn);

    let first = roster.add_proposal("  Alpha   Systems ", None).unwrap();
    let pinned = roster.add_proposal("Beta", Some(10)).unwrap();
    let third = roster.add_proposal("Gamma", None).unwrap();

    assert_eq!(first.name, "Alpha Systems");
    assert_eq!(first.order_num, 1);
    assert_eq!(pinned.order_num, 10);
    assert_eq!(third.order_num, 11);

    roster.reorder_proposal(third.id, 0).unwrap();
    let names: Vec<String> = roster
        .list_proposals()
        .unwrap()
        .into_iter()
        .map(|proposal| proposal.name)
        .collect();
    assert_eq!(names, vec!["Gamma", "Alpha Systems", "Beta"]);

    assert!(matches!(
        roster.add_proposal("   ", None),
        Err(RosterServiceError::InvalidName(_))
    ));
    let renamed = roster.rename_proposal(pinned.id, "Beta Labs").unwrap();
    assert_eq!(renamed.name, "Beta Labs");
}

#[test]
fn login_finds_or_creates_by_normalized_name() {
    let conn = open_db_in_memory().unwrap();
    let roster = roster(&conn);

    let first = roster.login_reviewer("Kim  Reviewer").unwrap();
    assert!(first.created);
    let again = roster.login_reviewer(" Kim Reviewer ").unwrap();
    assert!(!again.created);
    assert_eq!(again.reviewer.id, first.reviewer.id);
    assert_eq!(roster.list_reviewers().unwrap().len(), 1);

    assert!(matches!(
        roster.login_reviewer("\t"),
        Err(RosterServiceError::InvalidName(_))
    ));
}

#[test]
fn reviewer_rename_keeps_names_unique() {
    let conn = open_db_in_memory().unwrap();
    let roster = roster(&conn);
    let kim = roster.login_reviewer("Kim").unwrap().reviewer;
    let lee = roster.login_reviewer("Lee").unwrap().reviewer;

    assert!(matches!(
        roster.rename_reviewer(lee.id, "Kim"),
        Err(RosterServiceError::DuplicateReviewerName(name)) if name == "Kim"
    ));
    assert_eq!(roster.rename_reviewer(kim.id, "Kim").unwrap().name, "Kim");
    assert_eq!(roster.rename_reviewer(lee.id, "Park").unwrap().name, "Park");

    let store = SqliteStore::try_new(&conn).unwrap();
    assert!(store.find_reviewer_by_name("Lee").unwrap().is_none());
    assert!(matches!(
        roster.rename_reviewer(Reviewer::new("x").id, "Choi"),
        Err(RosterServiceError::ReviewerNotFound(_))
    ));
}

#[test]
fn deleting_a_proposal_cascades_to_its_scores() {
    let conn = open_db_in_memory().unwrap();
    let roster = roster(&conn);
    roster.install_default_rubric().unwrap();
    let alpha = roster.add_proposal("Alpha", None).unwrap();
    let beta = roster.add_proposal("Beta", None).unwrap();
    let kim = roster.login_reviewer("Kim").unwrap().reviewer;

    score_everything(&conn, &kim, &alpha, GradeLevel::Good);
    score_everything(&conn, &kim, &beta, GradeLevel::Good);
    assert_eq!(count(&conn, "scores"), 46);

    roster.delete_proposal(alpha.id).unwrap();
    assert_eq!(count(&conn, "scores"), 23);
    assert_eq!(count(&conn, "evaluations"), 1);
    assert!(matches!(
        roster.delete_proposal(alpha.id),
        Err(RosterServiceError::ProposalNotFound(id)) if id == alpha.id
    ));
}

#[test]
fn deleting_a_reviewer_cascades_to_scores_and_evaluations() {
    let conn = open_db_in_memory().unwrap();
    let roster = roster(&conn);
    roster.install_default_rubric().unwrap();
    let alpha = roster.add_proposal("Alpha", None).unwrap();
    let kim = roster.login_reviewer("Kim").unwrap().reviewer;
    let lee = roster.login_reviewer("Lee").unwrap().reviewer;

    score_everything(&conn, &kim, &alpha, GradeLevel::Excellent);
    score_everything(&conn, &lee, &alpha, GradeLevel::Fair);

    roster.delete_reviewer(kim.id).unwrap();
    assert_eq!(count(&conn, "scores"), 23);
    assert_eq!(count(&conn, "evaluations"), 1);
    assert_eq!(roster.list_reviewers().unwrap(), vec![lee]);
}

#[test]
fn reset_wipes_panel_data_but_keeps_proposals_and_rubric() {
    let conn = open_db_in_memory().unwrap();
    let roster = roster(&conn);
    roster.install_default_rubric().unwrap();
    let alpha = roster.add_proposal("Alpha", None).unwrap();
    let kim = roster.login_reviewer("Kim").unwrap().reviewer;
    score_everything(&conn, &kim, &alpha, GradeLevel::VeryGood);

    let before = roster.data_status().unwrap();
    assert_eq!(
        (before.reviewers, before.evaluations, before.scores),
        (1, 1, 23)
    );

    let summary = roster.reset_evaluations().unwrap();
    assert_eq!(
        (summary.reviewers, summary.evaluations, summary.scores),
        (1, 1, 23)
    );

    let after = roster.data_status().unwrap();
    assert_eq!((after.reviewers, after.evaluations, after.scores), (0, 0, 0));
    assert_eq!((after.proposals, after.criteria), (1, 23));
}

#[test]
fn status_counts_serialize_for_json_output() {
    let conn = open_db_in_memory().unwrap();
    let roster = roster(&conn);
    roster.add_proposal("Alpha", None).unwrap();

    let value = serde_json::to_value(roster.data_status().unwrap()).unwrap();
    assert_eq!(value["proposals"], 1);
    assert_eq!(value["reviewers"], 0);
}
