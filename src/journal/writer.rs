//! Append-only writer for the run journal

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{BridgeResult, SyncError};

use super::entry::RunEntry;

/// Writes run entries to `runs.log`, one JSON object per line
pub struct RunJournal {
    log_path: PathBuf,
}

impl RunJournal {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append an entry, flushing before returning
    pub fn append(&self, entry: &RunEntry) -> BridgeResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| SyncError::Persistence(format!("Failed to open run journal: {}", e)))?;

        let json = serde_json::to_string(entry)?;

        writeln!(file, "{}", json)
            .map_err(|e| SyncError::Persistence(format!("Failed to write run journal: {}", e)))?;
        file.flush()
            .map_err(|e| SyncError::Persistence(format!("Failed to flush run journal: {}", e)))?;

        Ok(())
    }

    /// All entries, oldest first
    ///
    /// A line that does not parse (a run killed mid-write) is skipped.
    pub fn read_all(&self) -> BridgeResult<Vec<RunEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| SyncError::Persistence(format!("Failed to open run journal: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                SyncError::Persistence(format!(
                    "Failed to read run journal line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RunEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(line = line_num + 1, "Unreadable journal entry: {}", e),
            }
        }

        Ok(entries)
    }

    /// The most recent `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> BridgeResult<Vec<RunEntry>> {
        let mut all = self.read_all()?;
        let start = all.len().saturating_sub(count);
        Ok(all.split_off(start))
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
