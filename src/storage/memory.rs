//! In-memory state store
//!
//! Same semantics as the JSON store without durability. Used for dry
//! experiments and as the default store in engine tests.

use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::SyncError;
use crate::models::{Direction, SyncCheckpoint};

use super::state::SyncState;
use super::StateStore;

#[derive(Default)]
pub struct MemoryStateStore {
    state: RwLock<SyncState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_read<T>(&self, f: impl FnOnce(&SyncState) -> T) -> Result<T, SyncError> {
        let guard = self
            .state
            .read()
            .map_err(|e| SyncError::Persistence(format!("Failed to acquire read lock: {}", e)))?;
        Ok(f(&guard))
    }

    fn with_write<T>(&self, f: impl FnOnce(&mut SyncState) -> T) -> Result<T, SyncError> {
        let mut guard = self
            .state
            .write()
            .map_err(|e| SyncError::Persistence(format!("Failed to acquire write lock: {}", e)))?;
        Ok(f(&mut guard))
    }

    #[cfg(test)]
    pub(crate) fn set_raw_checkpoint(&self, direction: Direction, value: &str) {
        let _ = self.with_write(|state| state.set_raw_checkpoint(direction, value));
    }
}

impl StateStore for MemoryStateStore {
    fn get_checkpoint(&self, direction: Direction) -> Result<Option<SyncCheckpoint>, SyncError> {
        self.with_read(|state| state.checkpoint(direction))
    }

    fn commit_checkpoint(&self, direction: Direction, date: NaiveDate) -> Result<(), SyncError> {
        self.with_write(|state| {
            state.advance_checkpoint(direction, date);
        })
    }

    fn has_synced(&self, direction: Direction, id: &str) -> Result<bool, SyncError> {
        self.with_read(|state| state.contains(direction, id))
    }

    fn record_synced(&self, direction: Direction, id: &str) -> Result<(), SyncError> {
        self.with_write(|state| {
            state.record(direction, id);
        })
    }

    fn synced_count(&self, direction: Direction) -> Result<usize, SyncError> {
        self.with_read(|state| state.records(direction).len())
    }
}
