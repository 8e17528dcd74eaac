//! Connection handling and the migration bookkeeping store.
//!
//! A [`MigrationStore`] owns the single connection for the whole run. Every
//! bookkeeping write autocommits the moment it executes, so a crash between
//! `insert_pending` and `mark_clean` leaves a visible `dirty=1` breadcrumb
//! for the next invocation to trip over.

use crate::core::error::MigrateError;
use crate::core::schemas;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::debug;

/// The most recent migration attempt, successful or not.
///
/// An empty `migrations` table yields the all-`None` sentinel.
#[derive(Debug, Clone, Default)]
pub struct MigrationHead {
    pub version: Option<String>,
    pub description: Option<String>,
    pub dirty: bool,
    pub created_at: Option<String>,
}

pub struct MigrationStore {
    conn: Connection,
}

impl MigrationStore {
    /// Open (or create) the database file under `data_dir`.
    ///
    /// Any failure here is fatal: nothing else in the tool can run without
    /// the connection.
    pub fn open(data_dir: &Path) -> Result<Self, MigrateError> {
        let db_path = data_dir.join(schemas::DB_FILE);
        let conn = Connection::open(&db_path)
            .map_err(|e| MigrateError::Connection(format!("{}: {}", db_path.display(), e)))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
        conn.execute("PRAGMA foreign_keys=ON;", [])?;
        debug!("opened database {}", db_path.display());
        Ok(Self { conn })
    }

    /// Create the bookkeeping table if absent. No-op when it already exists.
    pub fn ensure_schema(&self) -> Result<(), MigrateError> {
        debug!("creating migrations table if not exists");
        self.conn.execute(schemas::MIGRATIONS_TABLE_SCHEMA, [])?;
        Ok(())
    }

    /// Read the head: the most recent record by insertion order.
    pub fn head(&self) -> Result<MigrationHead, MigrateError> {
        debug!("reading migration head version");
        let row = self
            .conn
            .query_row(
                "SELECT version, description, dirty, created_at FROM migrations
                 ORDER BY migration_id DESC LIMIT 1",
                [],
                |row| {
                    Ok(MigrationHead {
                        version: Some(row.get(0)?),
                        description: Some(row.get(1)?),
                        dirty: row.get::<_, i64>(2)? != 0,
                        created_at: Some(row.get(3)?),
                    })
                },
            )
            .optional()?;
        Ok(row.unwrap_or_default())
    }

    /// Record that a migration is about to run. Autocommits immediately so the
    /// `dirty=1` row survives a crash mid-script. Returns the new record id.
    pub fn insert_pending(&self, version: &str, description: &str) -> Result<i64, MigrateError> {
        self.conn.execute(
            "INSERT INTO migrations (version, description, dirty) VALUES (?1, ?2, 1)",
            params![version, description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Flip a record to `dirty=0` after its script completed.
    pub fn mark_clean(&self, migration_id: i64) -> Result<(), MigrateError> {
        self.conn.execute(
            "UPDATE migrations SET dirty = 0 WHERE migration_id = ?1",
            params![migration_id],
        )?;
        Ok(())
    }

    /// Execute a full migration script (potentially many statements) as one
    /// batch. The raw error is propagated so the runner can attribute it to
    /// the failing file.
    pub fn execute_script(&self, sql: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(sql)
    }

    /// Borrow the underlying connection. The legacy importer owns its own SQL
    /// against this shared connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
