//! Destination drafts built by the translator
//!
//! A draft is everything a destination API needs to create one record. Drafts
//! carry the id of the source transaction so failures can be reported against
//! it.

use chrono::NaiveDate;

use super::money::Money;

/// A transaction to be created in the budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetTransactionDraft {
    pub source_id: String,
    /// Budget account the transaction is booked against
    pub account_id: String,
    pub date: NaiveDate,
    /// Signed amount; outflows are negative
    pub amount: Money,
    pub payee_name: String,
    pub memo: Option<String>,
    /// `None` leaves the transaction uncategorised
    pub category_id: Option<String>,
    pub cleared: bool,
    /// Lets the budget service reject a duplicate create on its side too
    pub import_id: String,
}

/// An expense to be created in the shared ledger, split between two people
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerExpenseDraft {
    pub source_id: String,
    pub group_id: String,
    pub description: String,
    pub date: NaiveDate,
    /// Total cost, always positive
    pub cost: Money,
    /// What the person who paid owes of the cost
    pub payer_share: Money,
    /// What the other member owes of the cost
    pub partner_share: Money,
}
