//! Persisted sync progress: checkpoints and synced-transaction records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// The last confirmed-synced date for one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncCheckpoint {
    pub direction: Direction,
    /// Calendar date in the configured timezone
    pub last_success_date: NaiveDate,
}

impl SyncCheckpoint {
    pub fn new(direction: Direction, last_success_date: NaiveDate) -> Self {
        Self {
            direction,
            last_success_date,
        }
    }
}

/// One transaction already propagated to the other system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedTransactionRecord {
    pub source_transaction_id: String,
    pub direction: Direction,
    pub synced_at: DateTime<Utc>,
}

impl SyncedTransactionRecord {
    /// Create a record stamped with the current time
    pub fn now(direction: Direction, source_transaction_id: impl Into<String>) -> Self {
        Self {
            source_transaction_id: source_transaction_id.into(),
            direction,
            synced_at: Utc::now(),
        }
    }
}
