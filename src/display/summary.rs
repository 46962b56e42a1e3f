//! Run summary formatting for terminal output

use crate::models::Direction;
use crate::sync::{CandidateOutcome, RunReport, SyncResult};

const WIDTH: usize = 56;

/// Format a separator line
fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Format a double separator line
fn double_separator(width: usize) -> String {
    "═".repeat(width)
}

/// Truncate a string to a maximum length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn direction_title(direction: Direction) -> &'static str {
    match direction {
        Direction::LedgerToBudget => "Splitwise -> YNAB",
        Direction::BudgetToLedger => "YNAB -> Splitwise",
    }
}

fn format_result(result: &SyncResult, output: &mut String) {
    output.push_str(&format!("  Window:      {}\n", result.window));
    output.push_str(&format!(
        "  Synced:      {} of {} new ({} already synced)\n",
        result.succeeded, result.attempted, result.already_synced
    ));
    if result.resettled > 0 {
        output.push_str(&format!("  Re-cleared:  {}\n", result.resettled));
    }
    if result.skipped > 0 {
        output.push_str(&format!("  Skipped:     {}\n", result.skipped));
    }
    if result.failed > 0 {
        output.push_str(&format!("  Failed:      {}\n", result.failed));
    }
    match result.checkpoint {
        Some(date) => output.push_str(&format!("  Checkpoint:  {}\n", date)),
        None => output.push_str("  Checkpoint:  held (will retry)\n"),
    }

    for outcome in &result.outcomes {
        let line = match outcome {
            CandidateOutcome::Synced { .. } => continue,
            CandidateOutcome::Skipped { source_id, reason } => {
                format!("    skip {}: {}", source_id, reason)
            }
            CandidateOutcome::Failed { source_id, error } => {
                format!("    FAIL {}: {}", source_id, error)
            }
        };
        output.push_str(&truncate(&line, WIDTH + 20));
        output.push('\n');
    }
}

/// Format a finished run for stdout
pub fn format_run_summary(report: &RunReport) -> String {
    let mut output = String::new();
    output.push_str("Sync Summary\n");
    output.push_str(&double_separator(WIDTH));
    output.push('\n');

    for (direction, result) in &report.results {
        output.push_str(direction_title(*direction));
        output.push('\n');
        match result {
            Ok(result) => format_result(result, &mut output),
            Err(e) => output.push_str(&format!("  ABORTED: {}\n", e)),
        }
        output.push_str(&separator(WIDTH));
        output.push('\n');
    }

    let elapsed = report.finished_at - report.started_at;
    output.push_str(&format!(
        "{} in {:.1}s\n",
        if report.has_failures() {
            "Finished with failures"
        } else {
            "All directions synced"
        },
        elapsed.num_milliseconds() as f64 / 1000.0
    ));
    output
}
