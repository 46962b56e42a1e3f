//! The reconciliation engine
//!
//! Data flow per direction:
//!
//! ```text
//! TimeWindowResolver -> fetch -> DedupFilter -> TransactionTranslator -> write -> StateStore
//! ```
//!
//! `SyncCoordinator` runs the two directions in sequence and is the only
//! entry point the binary uses.

pub mod clock;
pub mod coordinator;
pub mod dedup;
pub mod outcome;
pub mod resolver;
pub mod runner;
pub mod translate;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{RunReport, SyncCoordinator};
pub use dedup::DedupFilter;
pub use outcome::{CandidateOutcome, SyncResult};
pub use resolver::{TimeWindowResolver, FALLBACK_LOOKBACK_DAYS};
pub use runner::{BudgetToLedger, DirectionPort, LedgerToBudget, SyncDirectionRunner};
pub use translate::TransactionTranslator;
