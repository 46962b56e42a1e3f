//! Per-candidate outcomes and per-direction results

use chrono::NaiveDate;

use crate::models::{Direction, TimeWindow};

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Written to the destination and recorded
    Synced {
        source_id: String,
        destination_id: String,
    },
    /// Not written; the candidate could not be translated
    Skipped { source_id: String, reason: String },
    /// A remote call failed; the candidate stays eligible for the next run
    Failed { source_id: String, error: String },
}

impl CandidateOutcome {
    pub fn source_id(&self) -> &str {
        match self {
            Self::Synced { source_id, .. }
            | Self::Skipped { source_id, .. }
            | Self::Failed { source_id, .. } => source_id,
        }
    }
}

/// Result of running one direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub direction: Direction,
    pub window: TimeWindow,
    /// Fresh candidates processed this run
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Candidates fetched but already recorded as synced
    pub already_synced: usize,
    /// Already-synced candidates whose source flag was cleared again
    pub resettled: usize,
    pub outcomes: Vec<CandidateOutcome>,
    /// The checkpoint committed by this run, if it advanced
    pub checkpoint: Option<NaiveDate>,
}

impl SyncResult {
    pub fn new(direction: Direction, window: TimeWindow) -> Self {
        Self {
            direction,
            window,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            already_synced: 0,
            resettled: 0,
            outcomes: Vec::new(),
            checkpoint: None,
        }
    }

    /// Record an outcome and bump the matching counter
    pub fn push(&mut self, outcome: CandidateOutcome) {
        match &outcome {
            CandidateOutcome::Synced { .. } => self.succeeded += 1,
            CandidateOutcome::Skipped { .. } => self.skipped += 1,
            CandidateOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Source ids of the failed candidates
    pub fn failed_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CandidateOutcome::Failed { .. }))
            .map(CandidateOutcome::source_id)
            .collect()
    }
}
