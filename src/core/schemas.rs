//! SQL schema constants for the migration bookkeeping table.
//!
//! The entity tables (nodes, settings, groups, tags, subscriptions) are
//! created by the versioned `.sql` scripts themselves, never by this crate.

/// Database file name inside the data directory.
pub const DB_FILE: &str = "sqlite.db";

/// Bookkeeping table. Append-only: rows are inserted with `dirty=1` before a
/// script runs and flipped to `dirty=0` after it succeeds; nothing else is
/// ever updated or deleted.
pub const MIGRATIONS_TABLE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    migration_id INTEGER PRIMARY KEY,
    version TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    dirty INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP)
";
