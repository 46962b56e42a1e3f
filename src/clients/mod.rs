//! Remote API clients
//!
//! The engine talks to the two services through `LedgerApi` and `BudgetApi`.
//! The HTTP implementations live in `splitwise` and `ynab`; tests substitute
//! scripted fakes.

pub mod http;
pub mod splitwise;
pub mod ynab;

pub use splitwise::SplitwiseClient;
pub use ynab::YnabClient;

use chrono::NaiveDate;

use crate::error::BridgeResult;
use crate::models::{BudgetTransactionDraft, CandidateTransaction, FlagColor, LedgerExpenseDraft};

/// The shared-expense ledger
pub trait LedgerApi {
    /// Expenses dated within `[since, until]` that involve the current user,
    /// carrying the user's owed share
    fn fetch_owed_expenses(
        &self,
        since: NaiveDate,
        until: NaiveDate,
    ) -> BridgeResult<Vec<CandidateTransaction>>;

    /// Create a split expense, returning its ledger id
    fn create_expense(&self, draft: &LedgerExpenseDraft) -> BridgeResult<String>;
}

/// The personal budget
pub trait BudgetApi {
    /// Transactions carrying `flag` dated on or after `since`
    fn fetch_flagged(
        &self,
        flag: FlagColor,
        since: NaiveDate,
    ) -> BridgeResult<Vec<CandidateTransaction>>;

    /// Create a transaction, returning its budget id
    fn create_transaction(&self, draft: &BudgetTransactionDraft) -> BridgeResult<String>;

    /// Remove the flag from a transaction
    fn clear_flag(&self, transaction_id: &str) -> BridgeResult<()>;
}
