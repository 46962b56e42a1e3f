//! File I/O utilities with atomic writes
//!
//! The state file is rewritten in full on every commit, so writes go through a
//! temp file and a rename; a crash leaves either the old or the new file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::SyncError;

/// Read JSON from a file, returning a default value if file doesn't exist
///
/// A file that exists but does not parse is an error: silently starting from
/// an empty state would re-sync everything already recorded.
pub fn read_json<T, P>(path: P) -> Result<T, SyncError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| {
        SyncError::Persistence(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        SyncError::Persistence(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Write JSON to a file atomically (write to temp, fsync, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), SyncError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SyncError::Persistence(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| SyncError::Persistence(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| SyncError::Persistence(format!("Failed to serialize state: {}", e)))?;

    writer
        .flush()
        .map_err(|e| SyncError::Persistence(format!("Failed to flush state: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| SyncError::Persistence(format!("Failed to sync state: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        SyncError::Persistence(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}
