//! JSON file state store
//!
//! Keeps the whole sync state in one JSON file. Every mutation is applied to a
//! copy, written atomically, and only then swapped in, so the in-memory view
//! never runs ahead of what is on disk.

use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::SyncError;
use crate::models::{Direction, SyncCheckpoint};

use super::file_io::{read_json, write_json_atomic};
use super::state::SyncState;
use super::StateStore;

/// State store backed by `sync_state.json`
pub struct JsonStateStore {
    path: PathBuf,
    state: RwLock<SyncState>,
}

impl JsonStateStore {
    /// Open the store, loading any existing state from disk
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        let mut state: SyncState = read_json(&path)?;
        state.reindex();
        debug!(path = %path.display(), "Loaded sync state");

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, SyncState>, SyncError> {
        self.state
            .read()
            .map_err(|e| SyncError::Persistence(format!("Failed to acquire read lock: {}", e)))
    }

    /// Apply `change` to a copy of the state, persist it, then publish it
    fn update<F>(&self, change: F) -> Result<bool, SyncError>
    where
        F: FnOnce(&mut SyncState) -> bool,
    {
        let mut guard = self
            .state
            .write()
            .map_err(|e| SyncError::Persistence(format!("Failed to acquire write lock: {}", e)))?;

        let mut next = guard.clone();
        if !change(&mut next) {
            return Ok(false);
        }

        write_json_atomic(&self.path, &next)?;
        *guard = next;
        Ok(true)
    }
}

impl StateStore for JsonStateStore {
    fn get_checkpoint(&self, direction: Direction) -> Result<Option<SyncCheckpoint>, SyncError> {
        Ok(self.read()?.checkpoint(direction))
    }

    fn commit_checkpoint(&self, direction: Direction, date: NaiveDate) -> Result<(), SyncError> {
        if self.update(|state| state.advance_checkpoint(direction, date))? {
            info!(%direction, %date, "Checkpoint committed");
        } else {
            debug!(%direction, %date, "Checkpoint not moved backwards");
        }
        Ok(())
    }

    fn has_synced(&self, direction: Direction, id: &str) -> Result<bool, SyncError> {
        Ok(self.read()?.contains(direction, id))
    }

    fn record_synced(&self, direction: Direction, id: &str) -> Result<(), SyncError> {
        self.update(|state| state.record(direction, id))?;
        Ok(())
    }

    fn synced_count(&self, direction: Direction) -> Result<usize, SyncError> {
        Ok(self.read()?.records(direction).len())
    }
}
