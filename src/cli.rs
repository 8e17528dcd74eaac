//! CLI struct definitions for the migration tool.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "edgemigrate",
    version = env!("CARGO_PKG_VERSION"),
    about = "Schema migration and legacy persistence import for the edge gateway's embedded SQLite store."
)]
pub(crate) struct Cli {
    /// Increase log verbosity (repeat for more detail).
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Root directory holding the database file, the migration scripts, and
    /// the legacy adapters tree.
    #[clap(
        short = 'd',
        long = "data_dir",
        default_value = "persistence",
        global = true
    )]
    pub data_dir: PathBuf,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Print the current migration head.
    Show,
    /// One-time import of the legacy persistence layout into the relational schema.
    Import,
    /// Apply pending migration scripts in version order.
    Up {
        /// Stop at this version instead of migrating to the latest.
        #[clap(long)]
        target: Option<String>,
    },
}
