//! Serializable sync state shared by the state store implementations

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Direction, SyncCheckpoint, SyncedTransactionRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Checkpoint as written to disk
///
/// The date is kept as text so that a hand-edited or truncated value is
/// reported as "no checkpoint" instead of failing the whole state load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCheckpoint {
    pub last_success_date: String,
    pub updated_at: DateTime<Utc>,
}

/// Everything the engine persists between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default)]
    checkpoints: BTreeMap<Direction, StoredCheckpoint>,
    #[serde(default)]
    synced: BTreeMap<Direction, Vec<SyncedTransactionRecord>>,
    #[serde(skip)]
    index: BTreeMap<Direction, HashSet<String>>,
}

impl SyncState {
    /// Rebuild the id index after deserializing
    pub fn reindex(&mut self) {
        self.index = self
            .synced
            .iter()
            .map(|(direction, records)| {
                let ids = records
                    .iter()
                    .map(|r| r.source_transaction_id.clone())
                    .collect();
                (*direction, ids)
            })
            .collect();
    }

    pub fn checkpoint(&self, direction: Direction) -> Option<SyncCheckpoint> {
        let stored = self.checkpoints.get(&direction)?;
        match NaiveDate::parse_from_str(&stored.last_success_date, DATE_FORMAT) {
            Ok(date) => Some(SyncCheckpoint::new(direction, date)),
            Err(e) => {
                warn!(
                    %direction,
                    value = %stored.last_success_date,
                    "Ignoring unparsable checkpoint: {}",
                    e
                );
                None
            }
        }
    }

    /// Move the checkpoint forward to `date`
    ///
    /// Returns false (and leaves the state untouched) when `date` is earlier
    /// than the stored checkpoint.
    pub fn advance_checkpoint(&mut self, direction: Direction, date: NaiveDate) -> bool {
        if let Some(current) = self.checkpoint(direction) {
            if date < current.last_success_date {
                return false;
            }
        }
        self.checkpoints.insert(
            direction,
            StoredCheckpoint {
                last_success_date: date.format(DATE_FORMAT).to_string(),
                updated_at: Utc::now(),
            },
        );
        true
    }

    pub fn contains(&self, direction: Direction, id: &str) -> bool {
        self.index
            .get(&direction)
            .is_some_and(|ids| ids.contains(id))
    }

    /// Append a synced record; returns false if the id was already present
    pub fn record(&mut self, direction: Direction, id: &str) -> bool {
        if self.contains(direction, id) {
            return false;
        }
        self.synced
            .entry(direction)
            .or_default()
            .push(SyncedTransactionRecord::now(direction, id));
        self.index
            .entry(direction)
            .or_default()
            .insert(id.to_string());
        true
    }

    pub fn records(&self, direction: Direction) -> &[SyncedTransactionRecord] {
        self.synced
            .get(&direction)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    #[cfg(test)]
    pub(crate) fn set_raw_checkpoint(&mut self, direction: Direction, value: &str) {
        self.checkpoints.insert(
            direction,
            StoredCheckpoint {
                last_success_date: value.to_string(),
                updated_at: Utc::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_checkpoint_never_moves_backwards() {
        let mut state = SyncState::default();
        assert!(state.advance_checkpoint(Direction::LedgerToBudget, date(2024, 11, 10)));
        assert!(!state.advance_checkpoint(Direction::LedgerToBudget, date(2024, 11, 9)));
        assert!(state.advance_checkpoint(Direction::LedgerToBudget, date(2024, 11, 10)));

        let cp = state.checkpoint(Direction::LedgerToBudget).unwrap();
        assert_eq!(cp.last_success_date, date(2024, 11, 10));
    }

    #[test]
    fn test_checkpoints_are_per_direction() {
        let mut state = SyncState::default();
        state.advance_checkpoint(Direction::LedgerToBudget, date(2024, 11, 10));
        assert!(state.checkpoint(Direction::BudgetToLedger).is_none());
    }

    #[test]
    fn test_unparsable_checkpoint_reads_as_absent() {
        let mut state = SyncState::default();
        state.set_raw_checkpoint(Direction::BudgetToLedger, "2024-13-45");
        assert!(state.checkpoint(Direction::BudgetToLedger).is_none());

        // A later commit replaces the bad value
        assert!(state.advance_checkpoint(Direction::BudgetToLedger, date(2024, 11, 1)));
        assert!(state.checkpoint(Direction::BudgetToLedger).is_some());
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut state = SyncState::default();
        assert!(state.record(Direction::LedgerToBudget, "101"));
        assert!(!state.record(Direction::LedgerToBudget, "101"));
        assert_eq!(state.records(Direction::LedgerToBudget).len(), 1);
        assert!(!state.contains(Direction::BudgetToLedger, "101"));
    }

    #[test]
    fn test_reindex_after_deserialize() {
        let mut state = SyncState::default();
        state.record(Direction::BudgetToLedger, "abc");
        let json = serde_json::to_string(&state).unwrap();

        let mut loaded: SyncState = serde_json::from_str(&json).unwrap();
        assert!(!loaded.contains(Direction::BudgetToLedger, "abc"));
        loaded.reindex();
        assert!(loaded.contains(Direction::BudgetToLedger, "abc"));
    }
}
