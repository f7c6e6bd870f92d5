//! # Gateway Errors
//!
//! Ordinary HTTP failures never show up here: they come back as
//! [`ApiResponse::Failure`](crate::response::ApiResponse::Failure). Only the
//! conditions a caller must treat differently from a backend error are
//! surfaced as `Err`.

use std::time::Duration;

/// Errors returned by [`Gateway::call`](crate::Gateway::call).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The breaker is protecting the backend. Try again after `retry_in`.
    #[error("Circuit is open. No calls are allowed (retry in {retry_in:?})")]
    CircuitOpen { retry_in: Duration },
    /// The caller cancelled the call before a response was processed.
    #[error("Request cancelled")]
    Cancelled,
    /// The request could not be built. Nothing was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, GatewayError::CircuitOpen { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }
}

/// Network-layer failures reported by a [`Transport`](crate::transport::Transport).
///
/// These count toward the breaker threshold exactly like an HTTP error status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request timeout: {0}")]
    Timeout(String),
    #[error("Connection error: {0}")]
    Connect(String),
    #[error("HTTP error: {0}")]
    Other(String),
}
