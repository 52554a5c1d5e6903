//! Criterion (rubric) repository.
//!
//! Criteria are reference data: installed once into an empty table and only
//! read afterwards.

use super::{RepoResult, SqliteStore};
use crate::model::criterion::Criterion;
use rusqlite::{params, Transaction, TransactionBehavior};

pub trait CriterionRepository {
    /// Inserts `criteria` when the table is empty.
    ///
    /// Returns the number of rows inserted (`0` when a rubric already exists).
    fn install_rubric(&self, criteria: &[Criterion]) -> RepoResult<usize>;
    /// All criteria in display order.
    fn list_criteria(&self) -> RepoResult<Vec<Criterion>>;
}

impl CriterionRepository for SqliteStore<'_> {
    fn install_rubric(&self, criteria: &[Criterion]) -> RepoResult<usize> {
        for criterion in criteria {
            criterion.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn(), TransactionBehavior::Immediate)?;
        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM criteria;", [], |row| row.get(0))?;
        if existing > 0 {
            tx.commit()?;
            return Ok(0);
        }

        for criterion in criteria {
            tx.execute(
                "INSERT INTO criteria (id, category, sub_category, name, max_score, order_num)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    criterion.id.trim(),
                    criterion.category.as_str(),
                    criterion.sub_category.as_str(),
                    criterion.name.as_str(),
                    criterion.max_score,
                    criterion.order_num,
                ],
            )?;
        }
        tx.commit()?;
        Ok(criteria.len())
    }

    fn list_criteria(&self) -> RepoResult<Vec<Criterion>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, category, sub_category, name, max_score, order_num
             FROM criteria
             ORDER BY order_num ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut criteria = Vec::new();
        while let Some(row) = rows.next()? {
            let criterion = Criterion {
                id: row.get("id")?,
                category: row.get("category")?,
                sub_category: row.get("sub_category")?,
                name: row.get("name")?,
                max_score: row.get("max_score")?,
                order_num: row.get("order_num")?,
            };
            criterion.validate()?;
            criteria.push(criterion);
        }
        Ok(criteria)
    }
}
