//! Embedded schema steps, tracked through `PRAGMA user_version`.
//!
//! Steps are listed in ascending version order. Every pending step runs inside
//! one transaction, so a failed upgrade leaves the previous version in place.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "lookup_indexes",
        sql: include_str!("0002_lookup_indexes.sql"),
    },
];

/// Highest schema version this build can write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Names of the steps a database at `from_version` still needs, oldest first.
pub fn pending_migrations(from_version: u32) -> Vec<&'static str> {
    pending_steps(from_version)
        .iter()
        .map(|step| step.name)
        .collect()
}

/// Brings `conn` up to [`latest_version`].
///
/// Refuses databases written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let steps = pending_steps(from_version);
    if steps.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in steps {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from_version} to_version={latest} steps={}",
        steps.len()
    );
    Ok(())
}

fn pending_steps(from_version: u32) -> &'static [SchemaStep] {
    let applied = SCHEMA_STEPS.partition_point(|step| step.version <= from_version);
    &SCHEMA_STEPS[applied..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_strictly_increasing() {
        assert!(SCHEMA_STEPS
            .windows(2)
            .all(|pair| pair[0].version < pair[1].version));
        assert_eq!(SCHEMA_STEPS[0].version, 1);
    }

    #[test]
    fn pending_skips_applied_versions() {
        assert_eq!(pending_migrations(0), vec!["init", "lookup_indexes"]);
        assert_eq!(pending_migrations(1), vec!["lookup_indexes"]);
        assert!(pending_migrations(latest_version()).is_empty());
        assert!(pending_migrations(latest_version() + 5).is_empty());
    }
}
