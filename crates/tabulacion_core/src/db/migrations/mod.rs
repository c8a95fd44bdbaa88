//! Election schema migrations.
//!
//! # Responsibility
//! - Declare the registry and result schema steps, oldest first.
//! - Bring a connection from its recorded version up to the latest one.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly one.
//! - All pending steps run in one transaction; a failing step leaves the
//!   database at its previous version.
//! - The applied version is recorded in `PRAGMA user_version`.
//! - Uniqueness and reference rules live in the schema; it is the final
//!   authority over every application-level pre-check.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;
use std::time::Instant;

/// One schema step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SchemaStep {
    pub(crate) version: u32,
    pub(crate) name: &'static str,
    pub(crate) sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "registry",
        sql: include_str!("0001_registry.sql"),
    },
    SchemaStep {
        version: 2,
        name: "results",
        sql: include_str!("0002_results.sql"),
    },
];

/// Latest schema version this binary can produce.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Schema version recorded on `conn`; `0` for a fresh database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Runs every step newer than the recorded version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is newer than the binary.
/// - `Migration` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    upgrade(conn, SCHEMA_STEPS)
}

fn upgrade(conn: &mut Connection, steps: &[SchemaStep]) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let latest = steps.last().map_or(0, |step| step.version);
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending = pending_steps(steps, from_version);
    if pending.is_empty() {
        return Ok(());
    }

    let started_at = Instant::now();
    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::Migration {
                version: step.version,
                name: step.name,
                source,
            })?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from_version} to_version={latest} steps={} duration_ms={}",
        pending.len(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}

/// Steps newer than `version`, in order.
fn pending_steps(steps: &[SchemaStep], version: u32) -> &[SchemaStep] {
    let first_pending = steps.partition_point(|step| step.version <= version);
    &steps[first_pending..]
}
