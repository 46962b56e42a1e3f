//! Shared HTTP plumbing for the API clients

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{BridgeResult, SyncError};

/// Per-request timeout; the only cancellation a run has
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 300;

/// Build the blocking client shared by every call of one API client
pub fn build_client() -> BridgeResult<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("ledgerbridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SyncError::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// Send a request and decode a JSON success body
pub fn send_json<T: DeserializeOwned>(request: RequestBuilder, context: &str) -> BridgeResult<T> {
    let response = request
        .send()
        .map_err(|e| SyncError::api(context, format!("request failed: {}", e)))?;

    let status = response.status();
    debug!(context, %status, "HTTP response");

    if status.is_success() {
        return response
            .json::<T>()
            .map_err(|e| SyncError::api(context, format!("unexpected response body: {}", e)));
    }

    let body = response.text().unwrap_or_default();
    Err(error_for_status(status, context, &body))
}

/// Map a non-success status to an engine error
///
/// Rejected credentials are a configuration problem. Everything else,
/// including rate limiting and server errors, leaves the affected
/// transaction for a later run.
pub fn error_for_status(status: StatusCode, context: &str, body: &str) -> SyncError {
    let detail: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Configuration(format!(
            "{} rejected the credentials (HTTP {})",
            context,
            status.as_u16()
        )),
        _ if detail.is_empty() => SyncError::api(context, format!("HTTP {}", status.as_u16())),
        _ => SyncError::api(context, format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}
