//! Repository contracts and the SQLite-backed store.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per table group.
//! - Keep SQL details behind `SqliteStore`.
//! - Absorb transient lock contention with bounded retries.
//!
//! # Invariants
//! - Repository writes validate inputs before SQL mutations.
//! - Read paths reject malformed persisted rows instead of masking them.
//! - The store is the single source of truth; nothing is cached here.

use crate::db::DbError;
use crate::model::criterion::CriterionValidationError;
use crate::model::proposal::ProposalId;
use crate::model::reviewer::ReviewerId;
use log::warn;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use uuid::Uuid;

pub mod criterion_repo;
pub mod evaluation_repo;
pub mod proposal_repo;
pub mod reviewer_repo;

pub use criterion_repo::CriterionRepository;
pub use evaluation_repo::{EvaluationRepository, ResetSummary, StoreCounts};
pub use proposal_repo::ProposalRepository;
pub use reviewer_repo::ReviewerRepository;

pub type RepoResult<T> = Result<T, RepoError>;

const REQUIRED_TABLES: [&str; 5] = ["proposals", "reviewers", "criteria", "scores", "evaluations"];
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(CriterionValidationError),
    ProposalNotFound(ProposalId),
    ReviewerNotFound(ReviewerId),
    DuplicateReviewerName(String),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Db(err) => err.is_transient(),
            _ => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProposalNotFound(id) => write!(f, "proposal not found: {id}"),
            Self::ReviewerNotFound(id) => write!(f, "reviewer not found: {id}"),
            Self::DuplicateReviewerName(name) => {
                write!(f, "reviewer name already taken: `{name}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "database is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<CriterionValidationError> for RepoError {
    fn from(value: CriterionValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Everything the services need from storage.
pub trait ScoringStore:
    ProposalRepository + ReviewerRepository + CriterionRepository + EvaluationRepository
{
}

impl<T> ScoringStore for T where
    T: ProposalRepository + ReviewerRepository + CriterionRepository + EvaluationRepository
{
}

/// SQLite-backed implementation of every repository trait.
///
/// Borrows a migrated connection; cheap to copy into several services.
#[derive(Clone, Copy)]
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the schema was not migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }
}

/// Runs `call` until it succeeds, fails permanently, or `attempts` run out.
///
/// Only transient storage errors are retried; every other error returns on
/// the first occurrence.
pub fn with_retry<T, F>(attempts: u32, operation: &str, mut call: F) -> RepoResult<T>
where
    F: FnMut() -> RepoResult<T>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match call() {
            Err(err) if err.is_transient() && attempt < attempts => {
                warn!(
                    "event=storage_retry module=repo status=retry operation={operation} attempt={attempt} error={err}"
                );
                std::thread::sleep(RETRY_BACKOFF * attempt);
                attempt += 1;
            }
            result => return result,
        }
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
