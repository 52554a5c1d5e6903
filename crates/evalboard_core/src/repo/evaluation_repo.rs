//! Score and evaluation repository.
//!
//! # Invariants
//! - `replace_evaluation` deletes every prior score of the pair, inserts the
//!   new set and upserts the summary row in one immediate transaction; a
//!   repeated identical call leaves the same rows behind.
//! - Totals are listed in reviewer first-login order so that tie-breaking in
//!   aggregation is deterministic.

use super::{parse_uuid, RepoError, RepoResult, SqliteStore};
use crate::model::evaluation::{Evaluation, EvaluationWrite, ReviewerTotal, Score};
use crate::model::proposal::ProposalId;
use crate::model::reviewer::ReviewerId;
use crate::scoring::GradeLevel;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::Serialize;

/// Row counts for administrator status views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub proposals: usize,
    pub reviewers: usize,
    pub criteria: usize,
    pub scores: usize,
    pub evaluations: usize,
}

/// Rows removed by `reset_panel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    pub scores: usize,
    pub evaluations: usize,
    pub reviewers: usize,
}

pub trait EvaluationRepository {
    /// Replaces the scores and summary of one (reviewer, proposal) pair.
    fn replace_evaluation(&self, write: &EvaluationWrite) -> RepoResult<()>;
    fn get_evaluation(
        &self,
        reviewer_id: ReviewerId,
        proposal_id: ProposalId,
    ) -> RepoResult<Option<Evaluation>>;
    /// Sets the comment of an existing evaluation; returns `false` when absent.
    fn update_comment(
        &self,
        reviewer_id: ReviewerId,
        proposal_id: ProposalId,
        comment: &str,
    ) -> RepoResult<bool>;
    fn count_evaluations_for_reviewer(&self, reviewer_id: ReviewerId) -> RepoResult<usize>;
    /// Saved totals for one proposal, one per reviewer who scored it.
    fn list_totals_for_proposal(&self, proposal_id: ProposalId) -> RepoResult<Vec<ReviewerTotal>>;
    /// Deletes every score, evaluation and reviewer in one transaction.
    ///
    /// Proposals and criteria are kept.
    fn reset_panel(&self) -> RepoResult<ResetSummary>;
    fn store_counts(&self) -> RepoResult<StoreCounts>;
}

impl EvaluationRepository for SqliteStore<'_> {
    fn replace_evaluation(&self, write: &EvaluationWrite) -> RepoResult<()> {
        let reviewer_text = write.reviewer_id.to_string();
        let proposal_text = write.proposal_id.to_string();

        let tx = Transaction::new_unchecked(self.conn(), TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM scores WHERE reviewer_uuid = ?1 AND proposal_uuid = ?2;",
            params![reviewer_text.as_str(), proposal_text.as_str()],
        )?;

        for score in &write.scores {
            tx.execute(
                "INSERT INTO scores (reviewer_uuid, proposal_uuid, criterion_id, grade, score)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    reviewer_text.as_str(),
                    proposal_text.as_str(),
                    score.criterion_id.as_str(),
                    score.grade.level(),
                    score.value,
                ],
            )?;
        }

        tx.execute(
            "INSERT INTO evaluations (reviewer_uuid, proposal_uuid, total_score, comment, saved_at)
             VALUES (?1, ?2, ?3, ?4, (strftime('%s', 'now') * 1000))
             ON CONFLICT (reviewer_uuid, proposal_uuid) DO UPDATE SET
                total_score = excluded.total_score,
                comment = excluded.comment,
                saved_at = excluded.saved_at;",
            params![
                reviewer_text.as_str(),
                proposal_text.as_str(),
                write.total_score,
                write.comment.as_str(),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_evaluation(
        &self,
        reviewer_id: ReviewerId,
        proposal_id: ProposalId,
    ) -> RepoResult<Option<Evaluation>> {
        let reviewer_text = reviewer_id.to_string();
        let proposal_text = proposal_id.to_string();
        let summary = self
            .conn()
            .query_row(
                "SELECT total_score, comment, saved_at
                 FROM evaluations
                 WHERE reviewer_uuid = ?1 AND proposal_uuid = ?2;",
                params![reviewer_text.as_str(), proposal_text.as_str()],
                |row| {
                    Ok((
                        row.get::<_, f64>("total_score")?,
                        row.get::<_, String>("comment")?,
                        row.get::<_, i64>("saved_at")?,
                    ))
                },
            )
            .optional()?;

        let Some((total_score, comment, saved_at)) = summary else {
            return Ok(None);
        };

        Ok(Some(Evaluation {
            reviewer_id,
            proposal_id,
            total_score,
            comment,
            saved_at,
            scores: load_scores(self.conn(), &reviewer_text, &proposal_text)?,
        }))
    }

    fn update_comment(
        &self,
        reviewer_id: ReviewerId,
        proposal_id: ProposalId,
        comment: &str,
    ) -> RepoResult<bool> {
        let changed = self.conn().execute(
            "UPDATE evaluations
             SET comment = ?3, saved_at = (strftime('%s', 'now') * 1000)
             WHERE reviewer_uuid = ?1 AND proposal_uuid = ?2;",
            params![reviewer_id.to_string(), proposal_id.to_string(), comment],
        )?;
        Ok(changed > 0)
    }

    fn count_evaluations_for_reviewer(&self, reviewer_id: ReviewerId) -> RepoResult<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM evaluations WHERE reviewer_uuid = ?1;",
            [reviewer_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn list_totals_for_proposal(&self, proposal_id: ProposalId) -> RepoResult<Vec<ReviewerTotal>> {
        let mut stmt = self.conn().prepare(
            "SELECT r.uuid, r.name, e.total_score
             FROM evaluations e
             INNER JOIN reviewers r ON r.uuid = e.reviewer_uuid
             WHERE e.proposal_uuid = ?1
             ORDER BY r.created_at ASC, r.rowid ASC;",
        )?;
        let mut rows = stmt.query([proposal_id.to_string()])?;
        let mut totals = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            totals.push(ReviewerTotal {
                reviewer_id: parse_uuid(&uuid_text, "evaluations.reviewer_uuid")?,
                reviewer_name: row.get(1)?,
                total_score: row.get(2)?,
            });
        }
        Ok(totals)
    }

    fn reset_panel(&self) -> RepoResult<ResetSummary> {
        let tx = Transaction::new_unchecked(self.conn(), TransactionBehavior::Immediate)?;
        let scores = tx.execute("DELETE FROM scores;", [])?;
        let evaluations = tx.execute("DELETE FROM evaluations;", [])?;
        let reviewers = tx.execute("DELETE FROM reviewers;", [])?;
        tx.commit()?;
        Ok(ResetSummary {
            scores,
            evaluations,
            reviewers,
        })
    }

    fn store_counts(&self) -> RepoResult<StoreCounts> {
        Ok(StoreCounts {
            proposals: count_rows(self.conn(), "proposals")?,
            reviewers: count_rows(self.conn(), "reviewers")?,
            criteria: count_rows(self.conn(), "criteria")?,
            scores: count_rows(self.conn(), "scores")?,
            evaluations: count_rows(self.conn(), "evaluations")?,
        })
    }
}

fn load_scores(
    conn: &Connection,
    reviewer_uuid: &str,
    proposal_uuid: &str,
) -> RepoResult<Vec<Score>> {
    let mut stmt = conn.prepare(
        "SELECT s.criterion_id, s.grade, s.score
         FROM scores s
         INNER JOIN criteria c ON c.id = s.criterion_id
         WHERE s.reviewer_uuid = ?1 AND s.proposal_uuid = ?2
         ORDER BY c.order_num ASC, c.id ASC;",
    )?;
    let mut rows = stmt.query(params![reviewer_uuid, proposal_uuid])?;
    let mut scores = Vec::new();
    while let Some(row) = rows.next()? {
        let criterion_id: String = row.get(0)?;
        let level: i64 = row.get(1)?;
        let grade = u8::try_from(level)
            .ok()
            .and_then(|level| GradeLevel::try_from(level).ok())
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid grade `{level}` in scores.grade for criterion `{criterion_id}`"
                ))
            })?;
        scores.push(Score {
            criterion_id,
            grade,
            value: row.get(2)?,
        });
    }
    Ok(scores)
}

// `table` is always one of the fixed schema names above.
fn count_rows(conn: &Connection, table: &str) -> RepoResult<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    Ok(count as usize)
}
