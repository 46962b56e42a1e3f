//! Dedup against the synced-transaction records

use crate::error::BridgeResult;
use crate::models::{CandidateTransaction, Direction};
use crate::storage::StateStore;

/// Excludes candidates already recorded as synced for a direction
pub struct DedupFilter<'a> {
    store: &'a dyn StateStore,
}

impl<'a> DedupFilter<'a> {
    pub fn new(store: &'a dyn StateStore) -> Self {
        Self { store }
    }

    /// Candidates not yet synced, in their original order
    pub fn filter(
        &self,
        direction: Direction,
        candidates: Vec<CandidateTransaction>,
    ) -> BridgeResult<Vec<CandidateTransaction>> {
        Ok(self.partition(direction, candidates)?.0)
    }

    /// Split candidates into `(fresh, already_synced)`, both order-preserving
    pub fn partition(
        &self,
        direction: Direction,
        candidates: Vec<CandidateTransaction>,
    ) -> BridgeResult<(Vec<CandidateTransaction>, Vec<CandidateTransaction>)> {
        let mut fresh = Vec::with_capacity(candidates.len());
        let mut seen = Vec::new();

        for candidate in candidates {
            if self.store.has_synced(direction, &candidate.id)? {
                seen.push(candidate);
            } else {
                fresh.push(candidate);
            }
        }

        Ok((fresh, seen))
    }
}
