//! One-direction sync
//!
//! A run of one direction is: resolve window, fetch, dedup, then for each
//! fresh candidate translate, write, record. The checkpoint advances to the
//! window's end only when no candidate failed, and never past the date of a
//! candidate that was skipped as unmappable. Anything failed or skipped stays
//! unrecorded, so the next run (whose window starts at the checkpoint)
//! fetches it again and the dedup step lets only the unrecorded ones through.

use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

use crate::clients::{BudgetApi, LedgerApi};
use crate::error::{BridgeResult, SyncError};
use crate::models::{
    BudgetTransactionDraft, CandidateTransaction, Direction, FlagColor, LedgerExpenseDraft,
    TimeWindow,
};
use crate::storage::StateStore;

use super::dedup::DedupFilter;
use super::outcome::{CandidateOutcome, SyncResult};
use super::resolver::TimeWindowResolver;
use super::translate::TransactionTranslator;

/// The source and destination of one direction
pub trait DirectionPort {
    type Draft;

    fn direction(&self) -> Direction;

    /// Candidates from the source for `window`
    fn fetch(&self, window: &TimeWindow) -> BridgeResult<Vec<CandidateTransaction>>;

    fn translate(&self, candidate: &CandidateTransaction) -> BridgeResult<Self::Draft>;

    /// Write a draft to the destination, returning the destination id
    fn write(&self, draft: &Self::Draft) -> BridgeResult<String>;

    /// Tell the source the candidate has been carried over
    ///
    /// Runs only after the write is confirmed and recorded.
    fn acknowledge(&self, _candidate: &CandidateTransaction) -> BridgeResult<()> {
        Ok(())
    }

    /// Whether an already-synced candidate still needs `acknowledge`
    fn needs_acknowledge(&self, _candidate: &CandidateTransaction) -> bool {
        false
    }
}

/// Ledger expenses into the budget
pub struct LedgerToBudget<'a> {
    pub ledger: &'a dyn LedgerApi,
    pub budget: &'a dyn BudgetApi,
    pub translator: &'a TransactionTranslator,
}

impl DirectionPort for LedgerToBudget<'_> {
    type Draft = BudgetTransactionDraft;

    fn direction(&self) -> Direction {
        Direction::LedgerToBudget
    }

    fn fetch(&self, window: &TimeWindow) -> BridgeResult<Vec<CandidateTransaction>> {
        self.ledger.fetch_owed_expenses(window.since, window.until)
    }

    fn translate(&self, candidate: &CandidateTransaction) -> BridgeResult<BudgetTransactionDraft> {
        self.translator.to_budget(candidate)
    }

    fn write(&self, draft: &BudgetTransactionDraft) -> BridgeResult<String> {
        self.budget.create_transaction(draft)
    }
}

/// Days of budget history searched for flags, whatever the checkpoint
///
/// A flag can be set on a transaction dated before the last run.
pub const FLAG_LOOKBACK_DAYS: u64 = 30;

/// Flagged budget transactions into the ledger
pub struct BudgetToLedger<'a> {
    pub ledger: &'a dyn LedgerApi,
    pub budget: &'a dyn BudgetApi,
    pub translator: &'a TransactionTranslator,
    pub flag_color: FlagColor,
}

impl DirectionPort for BudgetToLedger<'_> {
    type Draft = LedgerExpenseDraft;

    fn direction(&self) -> Direction {
        Direction::BudgetToLedger
    }

    fn fetch(&self, window: &TimeWindow) -> BridgeResult<Vec<CandidateTransaction>> {
        let since = window
            .until
            .checked_sub_days(Days::new(FLAG_LOOKBACK_DAYS))
            .map_or(window.since, |d| d.min(window.since));
        let searched = TimeWindow::new(since, window.until);

        let flagged = self.budget.fetch_flagged(self.flag_color, searched.since)?;
        // Future-dated transactions are picked up once the window reaches them
        Ok(flagged
            .into_iter()
            .filter(|c| c.date.map_or(true, |d| searched.contains(d)))
            .collect())
    }

    fn translate(&self, candidate: &CandidateTransaction) -> BridgeResult<LedgerExpenseDraft> {
        self.translator.to_ledger(candidate)
    }

    fn write(&self, draft: &LedgerExpenseDraft) -> BridgeResult<String> {
        self.ledger.create_expense(draft)
    }

    fn acknowledge(&self, candidate: &CandidateTransaction) -> BridgeResult<()> {
        self.budget.clear_flag(&candidate.id)
    }

    fn needs_acknowledge(&self, candidate: &CandidateTransaction) -> bool {
        candidate.flag() == Some(self.flag_color)
    }
}

/// Runs one direction under the idempotence contract
pub struct SyncDirectionRunner<'a> {
    store: &'a dyn StateStore,
    resolver: &'a TimeWindowResolver<'a>,
}

impl<'a> SyncDirectionRunner<'a> {
    pub fn new(store: &'a dyn StateStore, resolver: &'a TimeWindowResolver<'a>) -> Self {
        Self { store, resolver }
    }

    /// Run the direction served by `port`
    ///
    /// # Errors
    ///
    /// Per-candidate failures are collected in the result. An error is
    /// returned only when the direction cannot continue: the window cannot be
    /// resolved, the fetch fails, or the state store cannot be written.
    pub fn run<P: DirectionPort>(&self, port: &P) -> BridgeResult<SyncResult> {
        let direction = port.direction();
        let window = self.resolver.resolve(direction)?;
        info!(%direction, %window, "Starting direction");

        let candidates = port.fetch(&window)?;
        let fetched = candidates.len();
        let (fresh, seen) = DedupFilter::new(self.store).partition(direction, candidates)?;
        info!(
            %direction,
            fetched,
            fresh = fresh.len(),
            already_synced = seen.len(),
            "Fetched candidates"
        );

        let mut result = SyncResult::new(direction, window);
        result.already_synced = seen.len();

        for candidate in seen.iter().filter(|c| port.needs_acknowledge(c)) {
            match port.acknowledge(candidate) {
                Ok(()) => {
                    info!(%direction, candidate = %candidate.id, "Cleared leftover marker");
                    result.resettled += 1;
                }
                Err(e) => {
                    warn!(%direction, candidate = %candidate.id, "Failed to clear leftover marker: {}", e);
                    result.push(CandidateOutcome::Failed {
                        source_id: candidate.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut skipped_dates = Vec::new();
        for candidate in &fresh {
            result.attempted += 1;
            let outcome = self.process(port, candidate)?;
            if matches!(outcome, CandidateOutcome::Skipped { .. }) {
                skipped_dates.push(candidate.date);
            }
            result.push(outcome);
        }

        let current = self
            .store
            .get_checkpoint(direction)?
            .map(|c| c.last_success_date);
        match next_checkpoint(&window, result.has_failures(), &skipped_dates) {
            Some(target) if current.map_or(true, |c| target >= c) => {
                self.store.commit_checkpoint(direction, target)?;
                result.checkpoint = Some(target);
                if target < window.until {
                    info!(%direction, checkpoint = %target, "Checkpoint kept at earliest skipped candidate");
                } else {
                    debug!(%direction, checkpoint = %target, "Checkpoint committed");
                }
            }
            _ => warn!(
                %direction,
                failed = result.failed,
                skipped = result.skipped,
                "Checkpoint held at {}",
                describe_checkpoint(current)
            ),
        }

        info!(
            %direction,
            attempted = result.attempted,
            succeeded = result.succeeded,
            failed = result.failed,
            skipped = result.skipped,
            "Direction finished"
        );
        Ok(result)
    }

    fn process<P: DirectionPort>(
        &self,
        port: &P,
        candidate: &CandidateTransaction,
    ) -> BridgeResult<CandidateOutcome> {
        let direction = port.direction();
        let source_id = candidate.id.clone();

        let draft = match port.translate(candidate) {
            Ok(draft) => draft,
            Err(SyncError::Unmappable { reason, .. }) => {
                warn!(%direction, candidate = %source_id, "Skipped: {}", reason);
                return Ok(CandidateOutcome::Skipped { source_id, reason });
            }
            Err(e) => {
                warn!(%direction, candidate = %source_id, "Translation failed: {}", e);
                return Ok(CandidateOutcome::Failed {
                    source_id,
                    error: e.to_string(),
                });
            }
        };

        let destination_id = match port.write(&draft) {
            Ok(id) => id,
            Err(e) if e.is_per_candidate() => {
                warn!(%direction, candidate = %source_id, "Write failed: {}", e);
                return Ok(CandidateOutcome::Failed {
                    source_id,
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        // A record that cannot be written aborts the direction
        self.store.record_synced(direction, &source_id)?;
        debug!(%direction, candidate = %source_id, destination = %destination_id, "Recorded");

        if let Err(e) = port.acknowledge(candidate) {
            warn!(%direction, candidate = %source_id, "Written but not acknowledged: {}", e);
            return Ok(CandidateOutcome::Failed {
                source_id,
                error: e.to_string(),
            });
        }

        Ok(CandidateOutcome::Synced {
            source_id,
            destination_id,
        })
    }
}

/// Where the checkpoint may move once a window has been processed
///
/// Any failure holds it. A skipped candidate caps it at the candidate's date
/// so the next window still covers it; a skipped candidate with no date
/// holds it.
fn next_checkpoint(
    window: &TimeWindow,
    failed: bool,
    skipped_dates: &[Option<NaiveDate>],
) -> Option<NaiveDate> {
    if failed {
        return None;
    }
    skipped_dates
        .iter()
        .try_fold(window.until, |target, date| date.map(|d| target.min(d)))
}

fn describe_checkpoint(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "none".to_string(), |d| d.to_string())
}
