//! Reviewer repository contract and SQLite implementation.
//!
//! # Invariants
//! - Display names are unique (`reviewers.name UNIQUE`); callers pass
//!   already-normalized names.
//! - `find_or_create_reviewer` is the only creation path.
//! - Deleting a reviewer cascades to their scores and evaluations.

use super::{bool_to_int, parse_flag, parse_uuid, RepoError, RepoResult, SqliteStore};
use crate::model::reviewer::{Reviewer, ReviewerId};
use rusqlite::{params, OptionalExtension, Row, Transaction, TransactionBehavior};

const REVIEWER_SELECT_SQL: &str = "SELECT uuid, name, is_submitted FROM reviewers";

pub trait ReviewerRepository {
    /// Returns the reviewer named `name`, creating it when absent.
    ///
    /// The boolean is `true` when a new row was inserted.
    fn find_or_create_reviewer(&self, name: &str) -> RepoResult<(Reviewer, bool)>;
    fn get_reviewer(&self, id: ReviewerId) -> RepoResult<Option<Reviewer>>;
    fn find_reviewer_by_name(&self, name: &str) -> RepoResult<Option<Reviewer>>;
    /// Reviewers in first-login order.
    fn list_reviewers(&self) -> RepoResult<Vec<Reviewer>>;
    fn rename_reviewer(&self, id: ReviewerId, name: &str) -> RepoResult<()>;
    fn set_submitted(&self, id: ReviewerId, submitted: bool) -> RepoResult<()>;
    /// Sets `submitted` only while the reviewer is unsubmitted and has an
    /// evaluation for every proposal (and at least one proposal exists).
    ///
    /// Guard and write are one statement; returns whether the flag was set.
    fn submit_if_complete(&self, id: ReviewerId) -> RepoResult<bool>;
    fn delete_reviewer(&self, id: ReviewerId) -> RepoResult<()>;
}

impl ReviewerRepository for SqliteStore<'_> {
    fn find_or_create_reviewer(&self, name: &str) -> RepoResult<(Reviewer, bool)> {
        let tx = Transaction::new_unchecked(self.conn(), TransactionBehavior::Immediate)?;
        if let Some(existing) = select_by_name(&tx, name)? {
            tx.commit()?;
            return Ok((existing, false));
        }

        let reviewer = Reviewer::new(name);
        tx.execute(
            "INSERT INTO reviewers (uuid, name, is_submitted) VALUES (?1, ?2, 0);",
            params![reviewer.id.to_string(), reviewer.name.as_str()],
        )?;
        tx.commit()?;
        Ok((reviewer, true))
    }

    fn get_reviewer(&self, id: ReviewerId) -> RepoResult<Option<Reviewer>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{REVIEWER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reviewer_row(row)?));
        }
        Ok(None)
    }

    fn find_reviewer_by_name(&self, name: &str) -> RepoResult<Option<Reviewer>> {
        select_by_name(self.conn(), name)
    }

    fn list_reviewers(&self) -> RepoResult<Vec<Reviewer>> {
        let mut stmt = self.conn().prepare(&format!(
            "{REVIEWER_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut reviewers = Vec::new();
        while let Some(row) = rows.next()? {
            reviewers.push(parse_reviewer_row(row)?);
        }
        Ok(reviewers)
    }

    fn rename_reviewer(&self, id: ReviewerId, name: &str) -> RepoResult<()> {
        let result = self.conn().execute(
            "UPDATE reviewers SET name = ?2 WHERE uuid = ?1;",
            params![id.to_string(), name],
        );
        match result {
            Ok(0) => Err(RepoError::ReviewerNotFound(id)),
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(RepoError::DuplicateReviewerName(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn set_submitted(&self, id: ReviewerId, submitted: bool) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE reviewers SET is_submitted = ?2 WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(submitted)],
        )?;
        if changed == 0 {
            return Err(RepoError::ReviewerNotFound(id));
        }
        Ok(())
    }

    fn submit_if_complete(&self, id: ReviewerId) -> RepoResult<bool> {
        let changed = self.conn().execute(
            "UPDATE reviewers
             SET is_submitted = 1
             WHERE uuid = ?1
               AND is_submitted = 0
               AND (SELECT COUNT(*) FROM proposals) > 0
               AND (SELECT COUNT(*) FROM evaluations WHERE reviewer_uuid = ?1)
                   = (SELECT COUNT(*) FROM proposals);",
            [id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn delete_reviewer(&self, id: ReviewerId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM reviewers WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ReviewerNotFound(id));
        }
        Ok(())
    }
}

fn select_by_name(conn: &rusqlite::Connection, name: &str) -> RepoResult<Option<Reviewer>> {
    let row = conn
        .query_row(
            &format!("{REVIEWER_SELECT_SQL} WHERE name = ?1;"),
            [name],
            |row| {
                Ok((
                    row.get::<_, String>("uuid")?,
                    row.get::<_, String>("name")?,
                    row.get::<_, i64>("is_submitted")?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((uuid_text, name, flag)) => Ok(Some(Reviewer {
            id: parse_uuid(&uuid_text, "reviewers.uuid")?,
            name,
            submitted: parse_flag(flag, "reviewers.is_submitted")?,
        })),
        None => Ok(None),
    }
}

fn parse_reviewer_row(row: &Row<'_>) -> RepoResult<Reviewer> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Reviewer {
        id: parse_uuid(&uuid_text, "reviewers.uuid")?,
        name: row.get("name")?,
        submitted: parse_flag(row.get("is_submitted")?, "reviewers.is_submitted")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
