//! edgemigrate: schema migration and legacy import for the gateway store.
//!
//! The gateway persists its configuration (nodes, groups, tags, subscriptions,
//! plugin settings) in a single embedded SQLite database. This crate advances
//! that database's schema through an ordered sequence of versioned `.sql`
//! scripts, and performs the one-time translation of the older, file-based
//! persistence layout into the relational schema.
//!
//! # Guarantees
//!
//! - **Ordering**: scripts apply in file-name order; version tokens are
//!   expected to be zero-padded so the two orders coincide.
//! - **Idempotence**: an applied version is never applied again; re-running
//!   `up` with no new scripts is a no-op.
//! - **Crash-safety**: each migration's bookkeeping row commits *before* its
//!   script runs (`dirty=1`) and flips clean after. An interrupted run leaves
//!   a dirty head that blocks further migration until an operator intervenes.
//!
//! The batch as a whole is not atomic: migrations that completed before a
//! failure stay applied.
//!
//! # Crate Structure
//!
//! - [`core::db`]: connection handling and the bookkeeping store
//! - [`core::resolver`]: which scripts apply, and in what order
//! - [`core::runner`]: the `up` loop
//! - [`core::import`]: the legacy layout importer
//! - [`core::report`]: the `show` command

pub mod core;

mod cli;

use crate::cli::{Cli, Command};
use crate::core::db::MigrationStore;
use crate::core::error::MigrateError;
use crate::core::{import, report, runner};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Map the repeated `-v` flag to a default log filter, overridable with
/// `RUST_LOG`.
fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Parse arguments and run the selected operation to completion.
///
/// The store is opened once, scoped to the whole run; every subcommand needs
/// it and the bookkeeping table.
pub fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = MigrationStore::open(&cli.data_dir)?;
    store.ensure_schema()?;

    match cli.command {
        Command::Show => report::print_head(&store),
        Command::Import => import::import_legacy(&store, &cli.data_dir),
        Command::Up { target } => runner::migrate_up(&store, &cli.data_dir, target.as_deref()),
    }
}
