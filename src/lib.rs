//! ledgerbridge - two-way sync between a shared-expense ledger and a budget
//!
//! Expenses shared in Splitwise show up in a YNAB account, and YNAB
//! transactions marked with a flag are split 50/50 into a Splitwise group.
//! The binary runs once per invocation; an external scheduler triggers it.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings (flags and environment) and state paths
//! - `error`: The `SyncError` type and its classification
//! - `models`: Money, directions, candidates, drafts, checkpoints
//! - `storage`: Durable sync state, JSON and in-memory stores, run lock
//! - `sync`: The reconciliation engine (resolver, dedup, translator, runner,
//!   coordinator)
//! - `clients`: HTTP clients for the two services
//! - `journal`: Append-only run journal
//! - `display`: Run summary formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgerbridge::storage::JsonStateStore;
//! use ledgerbridge::sync::{SyncCoordinator, SystemClock, TimeWindowResolver};
//!
//! let store = JsonStateStore::open(paths.state_file())?;
//! let resolver = TimeWindowResolver::new(&store, settings.timezone, &SystemClock);
//! let report = SyncCoordinator::new(&store, &resolver, &ledger, &budget, translator, flag)
//!     .run_all();
//! ```

pub mod clients;
pub mod config;
pub mod display;
pub mod error;
pub mod journal;
pub mod logging;
pub mod models;
pub mod storage;
pub mod sync;

pub use error::{BridgeResult, SyncError};
