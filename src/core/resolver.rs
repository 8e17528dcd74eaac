//! Decides which migration files apply and in what order.
//!
//! File names follow `<version>_<description>.sql`. The version token must not
//! contain `_` and must order correctly under plain string comparison, so
//! callers are expected to zero-pad (`0001`, `0002`, ...). Names that do not
//! yield a version are ignored, not errors.

use crate::core::error::MigrateError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Matches `<version>_<description>.sql`; a name without `_` still parses,
/// with the whole stem as the version and an empty description.
static MIGRATION_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?P<version>[^_]*)_?(?P<description>.*)\.sql").unwrap());

/// One applicable migration script, parsed from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub file_name: String,
    pub version: String,
    pub description: String,
}

/// Extract (version, description) from a migration file name, or `None` when
/// the name has no parseable non-empty version.
pub fn parse_migration_file(file_name: &str) -> Option<MigrationFile> {
    let caps = MIGRATION_FILE_RE.captures(file_name)?;
    let version = caps.name("version")?.as_str();
    if version.is_empty() {
        return None;
    }
    Some(MigrationFile {
        file_name: file_name.to_string(),
        version: version.to_string(),
        description: caps.name("description")?.as_str().to_string(),
    })
}

/// Compute the ordered subset of scripts in `dir` to apply on top of
/// `current_version`, optionally bounded by `target_version` (inclusive).
///
/// Versions compare as plain strings, matching how they were recorded. The
/// apply order is the raw file-name sort, which coincides with version order
/// exactly when version tokens are zero-padded to equal width.
pub fn pending_migrations(
    dir: &Path,
    current_version: &str,
    target_version: Option<&str>,
) -> Result<Vec<MigrationFile>, MigrateError> {
    if let Some(target) = target_version {
        if target == current_version {
            // already on the target version, nothing to apply
            return Ok(Vec::new());
        }
    }

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let Some(parsed) = parse_migration_file(&file_name) else {
            debug!("skipping `{}`: no version in file name", file_name);
            continue;
        };
        if parsed.version.as_str() <= current_version {
            continue;
        }
        if let Some(target) = target_version {
            if parsed.version.as_str() > target {
                continue;
            }
        }
        candidates.push(parsed);
    }

    // Raw file-name order is definitive, not the parsed version.
    candidates.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(candidates)
}
