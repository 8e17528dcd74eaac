use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to open database: {0}")]
    Connection(String),
    #[error("the migration database is dirty, please fix it manually")]
    DirtyState,
    #[error("migration `{file}` failed: {source}")]
    Script {
        file: String,
        source: rusqlite::Error,
    },
}
