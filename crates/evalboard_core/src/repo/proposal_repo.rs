//! Proposal repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `order_num ASC`, then insertion order.
//! - Deleting a proposal cascades to its scores and evaluations via foreign
//!   keys.

use super::{parse_uuid, RepoError, RepoResult, SqliteStore};
use crate::model::proposal::{Proposal, ProposalId};
use rusqlite::{params, Row};

const PROPOSAL_SELECT_SQL: &str = "SELECT uuid, name, order_num FROM proposals";

pub trait ProposalRepository {
    fn create_proposal(&self, proposal: &Proposal) -> RepoResult<ProposalId>;
    /// Replaces name and order of an existing proposal.
    fn update_proposal(&self, proposal: &Proposal) -> RepoResult<()>;
    fn get_proposal(&self, id: ProposalId) -> RepoResult<Option<Proposal>>;
    fn list_proposals(&self) -> RepoResult<Vec<Proposal>>;
    fn delete_proposal(&self, id: ProposalId) -> RepoResult<()>;
    fn count_proposals(&self) -> RepoResult<usize>;
    /// One past the highest `order_num`, or 1 when empty.
    fn next_order_num(&self) -> RepoResult<i64>;
}

impl ProposalRepository for SqliteStore<'_> {
    fn create_proposal(&self, proposal: &Proposal) -> RepoResult<ProposalId> {
        self.conn().execute(
            "INSERT INTO proposals (uuid, name, order_num) VALUES (?1, ?2, ?3);",
            params![
                proposal.id.to_string(),
                proposal.name.as_str(),
                proposal.order_num
            ],
        )?;
        Ok(proposal.id)
    }

    fn update_proposal(&self, proposal: &Proposal) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE proposals SET name = ?2, order_num = ?3 WHERE uuid = ?1;",
            params![
                proposal.id.to_string(),
                proposal.name.as_str(),
                proposal.order_num
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::ProposalNotFound(proposal.id));
        }
        Ok(())
    }

    fn get_proposal(&self, id: ProposalId) -> RepoResult<Option<Proposal>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{PROPOSAL_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_proposal_row(row)?));
        }
        Ok(None)
    }

    fn list_proposals(&self) -> RepoResult<Vec<Proposal>> {
        let mut stmt = self.conn().prepare(&format!(
            "{PROPOSAL_SELECT_SQL} ORDER BY order_num ASC, created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut proposals = Vec::new();
        while let Some(row) = rows.next()? {
            proposals.push(parse_proposal_row(row)?);
        }
        Ok(proposals)
    }

    fn delete_proposal(&self, id: ProposalId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM proposals WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ProposalNotFound(id));
        }
        Ok(())
    }

    fn count_proposals(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM proposals;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn next_order_num(&self) -> RepoResult<i64> {
        let next: i64 = self.conn().query_row(
            "SELECT COALESCE(MAX(order_num), 0) + 1 FROM proposals;",
            [],
            |row| row.get(0),
        )?;
        Ok(next)
    }
}

fn parse_proposal_row(row: &Row<'_>) -> RepoResult<Proposal> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Proposal {
        id: parse_uuid(&uuid_text, "proposals.uuid")?,
        name: row.get("name")?,
        order_num: row.get("order_num")?,
    })
}
