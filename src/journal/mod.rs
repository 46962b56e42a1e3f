//! Run journal for ledgerbridge
//!
//! Every run appends one entry to `runs.log`, a line-delimited JSON file in
//! the state directory. An entry holds each direction's counts, the
//! checkpoint it reached, and the error text of anything that failed, so
//! a past run can be inspected without re-running it.
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgerbridge::journal::{RunEntry, RunJournal};
//!
//! let journal = RunJournal::new(paths.journal_file());
//! journal.append(&RunEntry::from_report(&report))?;
//!
//! for entry in journal.read_recent(5)? {
//!     println!("{}", entry.format_human_readable());
//! }
//! ```

mod entry;
mod writer;

pub use entry::{DirectionEntry, DirectionStatus, FailureNote, RunEntry};
pub use writer::RunJournal;
