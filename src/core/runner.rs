//! Applies resolved migration scripts against the store, in order.
//!
//! Each migration is its own unit of work: its bookkeeping row commits before
//! the script runs and flips clean after. The batch as a whole is not atomic;
//! migrations applied before a failure stay applied.

use crate::core::db::MigrationStore;
use crate::core::error::MigrateError;
use crate::core::resolver;
use std::path::Path;
use tracing::debug;

/// Migrate to the latest state, or up to `target_version` when given.
///
/// Aborts before any write when the head is dirty: an earlier run recorded a
/// migration it never confirmed, and only an operator can decide whether the
/// script took effect.
pub fn migrate_up(
    store: &MigrationStore,
    dir: &Path,
    target_version: Option<&str>,
) -> Result<(), MigrateError> {
    let head = store.head()?;
    if head.dirty {
        return Err(MigrateError::DirtyState);
    }

    let current_version = head.version.unwrap_or_default();
    let pending = resolver::pending_migrations(dir, &current_version, target_version)?;
    debug!("{} migration(s) pending", pending.len());

    for migration in pending {
        println!("Applying migration {}", migration.file_name);

        let migration_id = store.insert_pending(&migration.version, &migration.description)?;
        let sql = std::fs::read_to_string(dir.join(&migration.file_name))?;
        store
            .execute_script(&sql)
            .map_err(|source| MigrateError::Script {
                file: migration.file_name.clone(),
                source,
            })?;
        store.mark_clean(migration_id)?;
    }

    Ok(())
}
