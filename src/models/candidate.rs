//! Candidate transactions fetched from a source system
//!
//! A candidate lives for one run only. Amount and date are optional because
//! the source may hand back incomplete records; the translator decides whether
//! a candidate can be carried across.

use chrono::NaiveDate;

use super::direction::FlagColor;
use super::money::Money;

/// Direction-specific data attached to a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateMarker {
    /// Ledger side: the current user's share. Positive means the user owes
    /// it, negative means it is owed to the user.
    OwedShare(Option<Money>),
    /// Budget side: the flag that asked for propagation
    Flag(FlagColor),
}

/// A transaction that may need to be propagated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTransaction {
    /// Identifier, unique within the source system
    pub id: String,
    /// Signed total amount as reported by the source
    pub amount: Option<Money>,
    /// Date the transaction happened
    pub date: Option<NaiveDate>,
    /// Payee or description text
    pub description: Option<String>,
    /// Free-form memo
    pub memo: Option<String>,
    pub marker: CandidateMarker,
}

impl CandidateTransaction {
    /// Create a ledger-side candidate
    pub fn owed(
        id: impl Into<String>,
        date: NaiveDate,
        total: Money,
        owed_share: Money,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            amount: Some(total),
            date: Some(date),
            description: Some(description.into()),
            memo: None,
            marker: CandidateMarker::OwedShare(Some(owed_share)),
        }
    }

    /// Create a budget-side flagged candidate
    pub fn flagged(
        id: impl Into<String>,
        date: NaiveDate,
        amount: Money,
        payee: impl Into<String>,
        flag: FlagColor,
    ) -> Self {
        Self {
            id: id.into(),
            amount: Some(amount),
            date: Some(date),
            description: Some(payee.into()),
            memo: None,
            marker: CandidateMarker::Flag(flag),
        }
    }

    /// The owed share, if this is a ledger-side candidate that carries one
    pub fn owed_share(&self) -> Option<Money> {
        match self.marker {
            CandidateMarker::OwedShare(share) => share,
            CandidateMarker::Flag(_) => None,
        }
    }

    /// The flag, if this is a budget-side candidate
    pub fn flag(&self) -> Option<FlagColor> {
        match self.marker {
            CandidateMarker::Flag(flag) => Some(flag),
            CandidateMarker::OwedShare(_) => None,
        }
    }

    /// Description with surrounding whitespace removed, if non-empty
    pub fn trimmed_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
