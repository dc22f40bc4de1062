//! Migration catalog: discovery and loading of ordered, checksummed
//! migration files.
//!
//! The catalog touches only the filesystem; it never talks to the database.
//! Callers pass an absolute directory, resolved by [`crate::config::Config`]
//! against the project root rather than the process cwd.

use crate::error::{CoreError, CoreResult};
use crate::migration::MigrationDefinition;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Load all migration definitions from `dir`, sorted by sequence.
///
/// Every entry in the directory must match the `NNNN_slug.sql` convention;
/// a stray file fails the whole load rather than being silently skipped.
pub fn load(dir: &Path) -> CoreResult<Vec<MigrationDefinition>> {
    if !dir.is_dir() {
        return Err(CoreError::MigrationsDirNotFound {
            path: dir.display().to_string(),
        });
    }

    let entries = fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut migrations = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            return Err(CoreError::InvalidMigrationFilename {
                filename: path.display().to_string(),
                reason: "directories are not allowed in the migrations directory".to_string(),
            });
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        // Editor droppings; everything else must parse
        if filename.starts_with('.') {
            log::debug!("Skipping hidden file in migrations dir: {}", filename);
            continue;
        }

        let bytes = fs::read(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let sql = String::from_utf8(bytes).map_err(|_| CoreError::NotUtf8 {
            filename: filename.clone(),
        })?;

        migrations.push(MigrationDefinition::from_sql(&filename, sql)?);
    }

    migrations.sort_by_key(|m| m.sequence);

    let mut seen: HashMap<u32, &str> = HashMap::new();
    for m in &migrations {
        if let Some(first) = seen.insert(m.sequence, m.filename.as_str()) {
            return Err(CoreError::DuplicateSequence {
                sequence: m.sequence,
                first: first.to_string(),
                second: m.filename.clone(),
            });
        }
    }

    log::debug!("Loaded {} migrations from {}", migrations.len(), dir.display());
    Ok(migrations)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
