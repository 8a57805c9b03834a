//! Schema migrations tracked through SQLite's `user_version`.

use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/0001_init.sql"),
}];

/// Latest schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations in one transaction.
pub(crate) fn apply_migrations(conn: &mut Connection) -> Result<(), StoreError> {
    let current = user_version(conn)?;
    let latest = latest_version();
    if current > latest {
        return Err(StoreError::UnsupportedSchemaVersion {
            found: current,
            supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;
    info!(from = current, to = latest, "applied schema migrations");
    Ok(())
}

fn user_version(conn: &Connection) -> Result<u32, StoreError> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
