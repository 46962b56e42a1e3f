//! Path management for ledgerbridge
//!
//! ## Path Resolution Order
//!
//! 1. `LEDGERBRIDGE_STATE_DIR` / `--state-dir` (if set)
//! 2. Unix: `$XDG_STATE_HOME/ledgerbridge` or `~/.local/state/ledgerbridge`
//! 3. Windows: `%LOCALAPPDATA%\ledgerbridge`

use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Manages all paths used by ledgerbridge
#[derive(Debug, Clone)]
pub struct BridgePaths {
    state_dir: PathBuf,
}

impl BridgePaths {
    /// Resolve paths, honouring an explicit override first
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no override is given and the home
    /// directory cannot be determined.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, SyncError> {
        let state_dir = match override_dir {
            Some(dir) => dir.to_path_buf(),
            None => resolve_default_path()?,
        };
        Ok(Self { state_dir })
    }

    /// Create BridgePaths with a custom state directory (useful for testing)
    pub fn with_state_dir(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Checkpoints and synced ids
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("sync_state.json")
    }

    /// Run lock
    pub fn lock_file(&self) -> PathBuf {
        self.state_dir.join("sync.lock")
    }

    /// Run journal (JSON lines)
    pub fn journal_file(&self) -> PathBuf {
        self.state_dir.join("runs.log")
    }

    /// Ensure the state directory exists
    pub fn ensure_directories(&self) -> Result<(), SyncError> {
        std::fs::create_dir_all(&self.state_dir).map_err(|e| {
            SyncError::Persistence(format!(
                "Failed to create state directory {}: {}",
                self.state_dir.display(),
                e
            ))
        })
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, SyncError> {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        if !state_home.is_empty() {
            return Ok(PathBuf::from(state_home).join("ledgerbridge"));
        }
    }
    let home = std::env::var("HOME").map_err(|_| {
        SyncError::Configuration(
            "Cannot determine state directory: set LEDGERBRIDGE_STATE_DIR or HOME".into(),
        )
    })?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("state")
        .join("ledgerbridge"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, SyncError> {
    let local = std::env::var("LOCALAPPDATA").map_err(|_| {
        SyncError::Configuration("Could not determine LOCALAPPDATA directory".into())
    })?;
    Ok(PathBuf::from(local).join("ledgerbridge"))
}
