//! Runs both directions and aggregates their outcomes

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::clients::{BudgetApi, LedgerApi};
use crate::error::BridgeResult;
use crate::models::{Direction, FlagColor};
use crate::storage::StateStore;

use super::outcome::SyncResult;
use super::resolver::TimeWindowResolver;
use super::runner::{BudgetToLedger, LedgerToBudget, SyncDirectionRunner};
use super::translate::TransactionTranslator;

/// Outcome of a whole run, keyed by direction in run order
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: BTreeMap<Direction, BridgeResult<SyncResult>>,
}

impl RunReport {
    pub fn result(&self, direction: Direction) -> Option<&BridgeResult<SyncResult>> {
        self.results.get(&direction)
    }

    /// True if a direction errored or any candidate failed
    pub fn has_failures(&self) -> bool {
        self.results.values().any(|r| match r {
            Ok(result) => result.has_failures(),
            Err(_) => true,
        })
    }

    pub fn exit_code(&self) -> u8 {
        u8::from(self.has_failures())
    }
}

/// Entry point of a sync run
pub struct SyncCoordinator<'a> {
    store: &'a dyn StateStore,
    resolver: &'a TimeWindowResolver<'a>,
    ledger: &'a dyn LedgerApi,
    budget: &'a dyn BudgetApi,
    translator: TransactionTranslator,
    flag_color: FlagColor,
}

impl<'a> SyncCoordinator<'a> {
    pub fn new(
        store: &'a dyn StateStore,
        resolver: &'a TimeWindowResolver<'a>,
        ledger: &'a dyn LedgerApi,
        budget: &'a dyn BudgetApi,
        translator: TransactionTranslator,
        flag_color: FlagColor,
    ) -> Self {
        Self {
            store,
            resolver,
            ledger,
            budget,
            translator,
            flag_color,
        }
    }

    /// Run both directions, ledger into budget first
    ///
    /// An error in one direction is logged and kept in the report; it never
    /// stops the other direction.
    pub fn run_all(&self) -> RunReport {
        let started_at = Utc::now();
        let runner = SyncDirectionRunner::new(self.store, self.resolver);
        let mut results = BTreeMap::new();

        for direction in Direction::ALL {
            let outcome = match direction {
                Direction::LedgerToBudget => runner.run(&LedgerToBudget {
                    ledger: self.ledger,
                    budget: self.budget,
                    translator: &self.translator,
                }),
                Direction::BudgetToLedger => runner.run(&BudgetToLedger {
                    ledger: self.ledger,
                    budget: self.budget,
                    translator: &self.translator,
                    flag_color: self.flag_color,
                }),
            };

            if let Err(e) = &outcome {
                error!(%direction, "Direction aborted: {}", e);
            }
            results.insert(direction, outcome);
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            results,
        };
        info!(failures = report.has_failures(), "Sync run finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::models::{CandidateTransaction, Money};
    use crate::sync::testing::*;

    fn owed(id: &str, day: u32, share: i64) -> CandidateTransaction {
        CandidateTransaction::owed(
            id,
            date(2024, 11, day),
            Money::from_minor(share * 2),
            Money::from_minor(share),
            "Dinner",
        )
    }

    fn flagged(id: &str, day: u32, amount: i64) -> CandidateTransaction {
        CandidateTransaction::flagged(
            id,
            date(2024, 11, day),
            Money::from_minor(amount),
            "Groceries",
            FlagColor::Red,
        )
    }

    #[test]
    fn test_both_directions_run_in_order() {
        let events = EventLog::default();
        let store = RecordingStore::with_events(&events);
        let ledger = FakeLedger::with_events(&events);
        let budget = FakeBudget::with_events(&events);
        ledger.expenses.borrow_mut().push(owed("sw-1", 12, 700));
        budget.flagged.borrow_mut().push(flagged("yn-1", 12, -900));

        let clock = sydney_clock();
        let resolver = TimeWindowResolver::new(&store, chrono_tz::Australia::Sydney, &clock);
        let coordinator = SyncCoordinator::new(
            &store,
            &resolver,
            &ledger,
            &budget,
            TransactionTranslator::new("acct", "group"),
            FlagColor::Red,
        );

        let report = coordinator.run_all();
        assert!(!report.has_failures());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            report.results.keys().copied().collect::<Vec<_>>(),
            Direction::ALL
        );
        assert_eq!(events.borrow().first().map(String::as_str), Some("budget.create:sw-1"));
        assert_eq!(events.borrow().last().map(String::as_str), Some("budget.clear:yn-1"));
    }

    #[test]
    fn test_direction_error_does_not_block_the_other() {
        let store = RecordingStore::default();
        let ledger = FakeLedger::default();
        let budget = FakeBudget::default();
        ledger.fail_fetch.set(true);
        budget.flagged.borrow_mut().push(flagged("yn-1", 12, -900));

        let clock = sydney_clock();
        let resolver = TimeWindowResolver::new(&store, chrono_tz::Australia::Sydney, &clock);
        let coordinator = SyncCoordinator::new(
            &store,
            &resolver,
            &ledger,
            &budget,
            TransactionTranslator::new("acct", "group"),
            FlagColor::Red,
        );

        let report = coordinator.run_all();
        assert!(matches!(
            report.result(Direction::LedgerToBudget),
            Some(Err(SyncError::TransientApi { .. }))
        ));
        let other = report
            .result(Direction::BudgetToLedger)
            .unwrap()
            .as_ref()
            .unwrap();
        assert_eq!(other.succeeded, 1);
        assert_eq!(ledger.created.borrow().len(), 1);

        assert!(report.has_failures());
        assert_eq!(report.exit_code(), 1);
        // The failed direction keeps no checkpoint
        assert!(store
            .get_checkpoint(Direction::LedgerToBudget)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_persistence_failure_is_contained_to_direction() {
        let store = RecordingStore::default();
        store.fail_writes.set(true);
        let ledger = FakeLedger::default();
        let budget = FakeBudget::default();
        ledger.expenses.borrow_mut().push(owed("sw-1", 12, 700));

        let clock = sydney_clock();
        let resolver = TimeWindowResolver::new(&store, chrono_tz::Australia::Sydney, &clock);
        let coordinator = SyncCoordinator::new(
            &store,
            &resolver,
            &ledger,
            &budget,
            TransactionTranslator::new("acct", "group"),
            FlagColor::Red,
        );

        let report = coordinator.run_all();
        assert!(matches!(
            report.result(Direction::LedgerToBudget),
            Some(Err(SyncError::Persistence(_)))
        ));
        // Nothing flagged, so the other direction only needs a checkpoint write,
        // which also fails
        assert!(matches!(
            report.result(Direction::BudgetToLedger),
            Some(Err(SyncError::Persistence(_)))
        ));
        assert_eq!(report.results.len(), 2);
    }
}
