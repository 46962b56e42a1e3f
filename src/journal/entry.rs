//! Run journal entry data structures

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Direction, TimeWindow};
use crate::sync::{CandidateOutcome, RunReport, SyncResult};

/// How a direction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionStatus {
    /// Ran to the end; candidates may still have failed
    Completed,
    /// Stopped early by a directional error
    Aborted,
}

impl std::fmt::Display for DirectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectionStatus::Completed => write!(f, "COMPLETED"),
            DirectionStatus::Aborted => write!(f, "ABORTED"),
        }
    }
}

/// A candidate that did not make it across
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureNote {
    pub source_id: String,
    /// `true` for unmappable candidates, `false` for failed writes
    pub skipped: bool,
    pub message: String,
}

/// One direction within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionEntry {
    pub direction: Direction,
    pub status: DirectionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<TimeWindow>,

    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub already_synced: usize,

    /// Checkpoint committed by this run, if it advanced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureNote>,

    /// Error that aborted the direction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DirectionEntry {
    fn completed(result: &SyncResult) -> Self {
        let failures = result
            .outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                CandidateOutcome::Synced { .. } => None,
                CandidateOutcome::Skipped { source_id, reason } => Some(FailureNote {
                    source_id: source_id.clone(),
                    skipped: true,
                    message: reason.clone(),
                }),
                CandidateOutcome::Failed { source_id, error } => Some(FailureNote {
                    source_id: source_id.clone(),
                    skipped: false,
                    message: error.clone(),
                }),
            })
            .collect();

        Self {
            direction: result.direction,
            status: DirectionStatus::Completed,
            window: Some(result.window),
            attempted: result.attempted,
            succeeded: result.succeeded,
            failed: result.failed,
            skipped: result.skipped,
            already_synced: result.already_synced,
            checkpoint: result.checkpoint,
            failures,
            error: None,
        }
    }

    fn aborted(direction: Direction, error: String) -> Self {
        Self {
            direction,
            status: DirectionStatus::Aborted,
            window: None,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            already_synced: 0,
            checkpoint: None,
            failures: Vec::new(),
            error: Some(error),
        }
    }
}

/// A single run journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntry {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// False if any direction aborted or any candidate failed
    pub clean: bool,
    pub directions: Vec<DirectionEntry>,
}

impl RunEntry {
    /// Summarise a finished run
    pub fn from_report(report: &RunReport) -> Self {
        let directions = report
            .results
            .iter()
            .map(|(direction, result)| match result {
                Ok(result) => DirectionEntry::completed(result),
                Err(e) => DirectionEntry::aborted(*direction, e.to_string()),
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            started_at: report.started_at,
            finished_at: report.finished_at,
            clean: !report.has_failures(),
            directions,
        }
    }

    pub fn direction(&self, direction: Direction) -> Option<&DirectionEntry> {
        self.directions.iter().find(|d| d.direction == direction)
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] run {}{}",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            &self.run_id.to_string()[..8],
            if self.clean { "" } else { " (with failures)" }
        );

        for d in &self.directions {
            output.push_str(&format!("\n  {} {}", d.direction, d.status));
            match &d.error {
                Some(error) => output.push_str(&format!(": {}", error)),
                None => output.push_str(&format!(
                    ": {} synced, {} failed, {} skipped",
                    d.succeeded, d.failed, d.skipped
                )),
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::collections::BTreeMap;

    fn report() -> RunReport {
        let day = NaiveDate::from_ymd_opt(2024, 11, 13).unwrap();
        let mut ok = SyncResult::new(Direction::LedgerToBudget, TimeWindow::new(day, day));
        ok.attempted = 2;
        ok.push(CandidateOutcome::Synced {
            source_id: "1".into(),
            destination_id: "a".into(),
        });
        ok.push(CandidateOutcome::Skipped {
            source_id: "2".into(),
            reason: "missing date".into(),
        });
        ok.checkpoint = Some(day);

        let mut results = BTreeMap::new();
        results.insert(Direction::LedgerToBudget, Ok(ok));
        results.insert(
            Direction::BudgetToLedger,
            Err(SyncError::api("ynab get_transactions", "HTTP 500")),
        );

        RunReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            results,
        }
    }

    #[test]
    fn test_entry_from_report() {
        let entry = RunEntry::from_report(&report());

        assert!(!entry.clean);
        let l2b = entry.direction(Direction::LedgerToBudget).unwrap();
        assert_eq!(l2b.status, DirectionStatus::Completed);
        assert_eq!(l2b.succeeded, 1);
        assert_eq!(l2b.failures.len(), 1);
        assert!(l2b.failures[0].skipped);

        let b2l = entry.direction(Direction::BudgetToLedger).unwrap();
        assert_eq!(b2l.status, DirectionStatus::Aborted);
        assert!(b2l.error.as_deref().unwrap().contains("HTTP 500"));
    }

    #[test]
    fn test_format_human_readable() {
        let formatted = RunEntry::from_report(&report()).format_human_readable();

        assert!(formatted.contains("(with failures)"));
        assert!(formatted.contains("ledger->budget COMPLETED: 1 synced, 0 failed, 1 skipped"));
        assert!(formatted.contains("budget->ledger ABORTED"));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let entry = RunEntry::from_report(&report());
        let json = serde_json::to_string(&entry).unwrap();

        assert!(json.contains("\"direction\":\"budget_to_ledger\""));
        assert!(json.contains("\"status\":\"aborted\""));
        let parsed: RunEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.directions, entry.directions);
    }
}
