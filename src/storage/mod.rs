//! Storage layer for ledgerbridge
//!
//! Durable sync progress (checkpoints and synced-transaction records) behind
//! the `StateStore` trait, a JSON file implementation with atomic writes, an
//! in-memory implementation, and the run lock.

pub mod file_io;
pub mod lock;
pub mod memory;
pub mod state;
pub mod state_file;

pub use file_io::{read_json, write_json_atomic};
pub use lock::RunLock;
pub use memory::MemoryStateStore;
pub use state_file::JsonStateStore;

use chrono::NaiveDate;

use crate::error::SyncError;
use crate::models::{Direction, SyncCheckpoint};

/// Durable key-value persistence for sync progress
///
/// Implementations must survive process restarts and apply each checkpoint
/// read-modify-write atomically per direction. Checkpoints never move
/// backwards and synced ids are never removed.
pub trait StateStore {
    /// The checkpoint for a direction, or `None` if absent or unparsable
    fn get_checkpoint(&self, direction: Direction) -> Result<Option<SyncCheckpoint>, SyncError>;

    /// Advance the checkpoint for a direction to `date`
    fn commit_checkpoint(&self, direction: Direction, date: NaiveDate) -> Result<(), SyncError>;

    /// Whether a source id has already been propagated in this direction
    fn has_synced(&self, direction: Direction, id: &str) -> Result<bool, SyncError>;

    /// Record a source id as propagated in this direction
    fn record_synced(&self, direction: Direction, id: &str) -> Result<(), SyncError>;

    /// Number of records kept for a direction
    fn synced_count(&self, direction: Direction) -> Result<usize, SyncError>;
}
