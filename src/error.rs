//! Error types for ledgerbridge
//!
//! One error enum covers the whole engine. The variants follow the failure
//! taxonomy of a sync run: some abort the process before anything happens,
//! some abort a single direction, and some only affect one candidate.

use thiserror::Error;

/// The main error type for ledgerbridge operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Missing or invalid configuration; fatal before any network call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A remote API call failed; the affected transaction stays unsynced
    #[error("API error ({context}): {message}")]
    TransientApi { context: String, message: String },

    /// A source transaction lacks the fields needed to build a draft
    #[error("Cannot map transaction {id}: {reason}")]
    Unmappable { id: String, reason: String },

    /// Another run holds the run lock
    #[error("Another sync run is active: {0}")]
    ConcurrentRun(String),

    /// The state store could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl SyncError {
    /// Create an API error for the given call context
    pub fn api(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransientApi {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an unmappable-transaction error
    pub fn unmappable(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unmappable {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Errors that concern a single candidate and never abort a direction
    pub fn is_per_candidate(&self) -> bool {
        matches!(self, Self::TransientApi { .. } | Self::Unmappable { .. })
    }

    /// Check if this is an unmappable-transaction error
    pub fn is_unmappable(&self) -> bool {
        matches!(self, Self::Unmappable { .. })
    }

    /// Process exit code used by the binary for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::ConcurrentRun(_) => 3,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Result type alias for ledgerbridge operations
pub type BridgeResult<T> = Result<T, SyncError>;
