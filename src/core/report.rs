//! Operator-facing report of the current migration head.

use crate::core::db::MigrationStore;
use crate::core::error::MigrateError;
use colored::Colorize;

/// Print the head version line, or `No version.` when nothing was ever
/// recorded. An empty table is a normal state, not an error.
pub fn print_head(store: &MigrationStore) -> Result<(), MigrateError> {
    let head = store.head()?;

    let Some(version) = head.version else {
        println!("No version.");
        return Ok(());
    };

    println!(
        "Version: {}, ({} {})",
        version,
        head.created_at.unwrap_or_default(),
        head.description.unwrap_or_default()
    );

    if head.dirty {
        println!(
            "{}",
            "Warning: the migration database is dirty".yellow().bold()
        );
    }

    Ok(())
}
