//! Display formatting for terminal output

pub mod summary;

pub use summary::format_run_summary;
