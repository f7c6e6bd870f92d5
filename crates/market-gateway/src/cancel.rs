//! # Cancellation
//!
//! A [`CancelHandle`] is the "stop button" for one call. Pressing it aborts
//! the in-flight request; pressing it again, or after the call finished, does
//! nothing.

use tokio_util::sync::CancellationToken;

/// Caller-side handle that aborts a gateway call.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the handle is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
