//! Configuration module for ledgerbridge
//!
//! - State directory resolution
//! - Settings collection (flags and environment) and validation

pub mod paths;
pub mod settings;

pub use paths::BridgePaths;
pub use settings::{
    parse_timezone, BudgetSettings, LedgerSettings, Secret, SettingsArgs, SyncSettings,
    DEFAULT_TIMEZONE,
};
