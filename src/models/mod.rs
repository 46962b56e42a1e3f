//! Core data models for ledgerbridge
//!
//! This module contains the data structures shared by the sync engine:
//! directions, candidates fetched from a source, drafts written to a
//! destination, and the persisted checkpoint/record types.

pub mod candidate;
pub mod checkpoint;
pub mod direction;
pub mod draft;
pub mod money;
pub mod window;

pub use candidate::{CandidateMarker, CandidateTransaction};
pub use checkpoint::{SyncCheckpoint, SyncedTransactionRecord};
pub use direction::{Direction, FlagColor};
pub use draft::{BudgetTransactionDraft, LedgerExpenseDraft};
pub use money::{Money, MoneyParseError};
pub use window::TimeWindow;
