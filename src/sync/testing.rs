//! Scripted fakes for engine tests
//!
//! Fakes share an event log so tests can assert on the order in which
//! destination writes, state records and flag clears happened.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::clients::{BudgetApi, LedgerApi};
use crate::error::{BridgeResult, SyncError};
use crate::models::{
    BudgetTransactionDraft, CandidateTransaction, Direction, FlagColor, LedgerExpenseDraft,
    SyncCheckpoint,
};
use crate::storage::{MemoryStateStore, StateStore};

use super::clock::FixedClock;

pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2024-11-13 10:00 in Sydney
pub fn sydney_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 11, 12, 23, 0, 0).unwrap())
}

pub fn today() -> NaiveDate {
    date(2024, 11, 13)
}

#[derive(Default)]
pub struct FakeLedger {
    pub expenses: RefCell<Vec<CandidateTransaction>>,
    pub created: RefCell<Vec<LedgerExpenseDraft>>,
    pub fail_create_for: RefCell<HashSet<String>>,
    pub fail_fetch: Cell<bool>,
    pub events: EventLog,
}

impl FakeLedger {
    pub fn with_events(events: &EventLog) -> Self {
        Self {
            events: Rc::clone(events),
            ..Self::default()
        }
    }

    pub fn fail_create(&self, source_id: &str) {
        self.fail_create_for.borrow_mut().insert(source_id.to_string());
    }

    pub fn heal(&self) {
        self.fail_create_for.borrow_mut().clear();
        self.fail_fetch.set(false);
    }
}

impl LedgerApi for FakeLedger {
    fn fetch_owed_expenses(
        &self,
        since: NaiveDate,
        until: NaiveDate,
    ) -> BridgeResult<Vec<CandidateTransaction>> {
        if self.fail_fetch.get() {
            return Err(SyncError::api("fake get_expenses", "HTTP 503"));
        }
        Ok(self
            .expenses
            .borrow()
            .iter()
            .filter(|c| c.date.map_or(true, |d| d >= since && d <= until))
            .cloned()
            .collect())
    }

    fn create_expense(&self, draft: &LedgerExpenseDraft) -> BridgeResult<String> {
        if self.fail_create_for.borrow().contains(&draft.source_id) {
            return Err(SyncError::api("fake create_expense", "HTTP 503"));
        }
        self.events
            .borrow_mut()
            .push(format!("ledger.create:{}", draft.source_id));
        let mut created = self.created.borrow_mut();
        created.push(draft.clone());
        Ok(format!("sw-{}", created.len()))
    }
}

#[derive(Default)]
pub struct FakeBudget {
    /// Transactions currently carrying a flag
    pub flagged: RefCell<Vec<CandidateTransaction>>,
    pub created: RefCell<Vec<BudgetTransactionDraft>>,
    pub cleared: RefCell<Vec<String>>,
    pub fail_create_for: RefCell<HashSet<String>>,
    pub fail_clear_for: RefCell<HashSet<String>>,
    pub fail_fetch: Cell<bool>,
    pub events: EventLog,
}

impl FakeBudget {
    pub fn with_events(events: &EventLog) -> Self {
        Self {
            events: Rc::clone(events),
            ..Self::default()
        }
    }

    pub fn is_flagged(&self, id: &str) -> bool {
        self.flagged.borrow().iter().any(|c| c.id == id)
    }

    pub fn heal(&self) {
        self.fail_create_for.borrow_mut().clear();
        self.fail_clear_for.borrow_mut().clear();
        self.fail_fetch.set(false);
    }
}

impl BudgetApi for FakeBudget {
    fn fetch_flagged(
        &self,
        flag: FlagColor,
        since: NaiveDate,
    ) -> BridgeResult<Vec<CandidateTransaction>> {
        if self.fail_fetch.get() {
            return Err(SyncError::api("fake get_transactions", "HTTP 500"));
        }
        Ok(self
            .flagged
            .borrow()
            .iter()
            .filter(|c| c.flag() == Some(flag))
            .filter(|c| c.date.map_or(true, |d| d >= since))
            .cloned()
            .collect())
    }

    fn create_transaction(&self, draft: &BudgetTransactionDraft) -> BridgeResult<String> {
        if self.fail_create_for.borrow().contains(&draft.source_id) {
            return Err(SyncError::api("fake create_transaction", "HTTP 429"));
        }
        self.events
            .borrow_mut()
            .push(format!("budget.create:{}", draft.source_id));
        let mut created = self.created.borrow_mut();
        created.push(draft.clone());
        Ok(format!("ynab-{}", created.len()))
    }

    fn clear_flag(&self, transaction_id: &str) -> BridgeResult<()> {
        if self.fail_clear_for.borrow().contains(transaction_id) {
            return Err(SyncError::api("fake update_transaction", "HTTP 502"));
        }
        self.events
            .borrow_mut()
            .push(format!("budget.clear:{}", transaction_id));
        self.flagged.borrow_mut().retain(|c| c.id != transaction_id);
        self.cleared.borrow_mut().push(transaction_id.to_string());
        Ok(())
    }
}

/// Memory store that logs records and can be told to fail writes
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStateStore,
    pub events: EventLog,
    pub fail_writes: Cell<bool>,
}

impl RecordingStore {
    pub fn with_events(events: &EventLog) -> Self {
        Self {
            events: Rc::clone(events),
            ..Self::default()
        }
    }

    fn check_writable(&self) -> BridgeResult<()> {
        if self.fail_writes.get() {
            return Err(SyncError::Persistence("disk full".into()));
        }
        Ok(())
    }
}

impl StateStore for RecordingStore {
    fn get_checkpoint(&self, direction: Direction) -> BridgeResult<Option<SyncCheckpoint>> {
        self.inner.get_checkpoint(direction)
    }

    fn commit_checkpoint(&self, direction: Direction, date: NaiveDate) -> BridgeResult<()> {
        self.check_writable()?;
        self.inner.commit_checkpoint(direction, date)
    }

    fn has_synced(&self, direction: Direction, id: &str) -> BridgeResult<bool> {
        self.inner.has_synced(direction, id)
    }

    fn record_synced(&self, direction: Direction, id: &str) -> BridgeResult<()> {
        self.check_writable()?;
        self.events
            .borrow_mut()
            .push(format!("store.record:{}:{}", direction, id));
        self.inner.record_synced(direction, id)
    }

    fn synced_count(&self, direction: Direction) -> BridgeResult<usize> {
        self.inner.synced_count(direction)
    }
}
