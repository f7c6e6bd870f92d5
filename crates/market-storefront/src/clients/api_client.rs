//! # ApiClient Trait
//!
//! Common plumbing for the backend clients: send through the shared
//! [`Gateway`], check the status the endpoint promises, and turn everything
//! else into the client's own error type.

use async_trait::async_trait;
use market_gateway::{ApiRequest, ApiResponse, CancelHandle, Gateway, GatewayError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Which statuses count as success for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Status(u16),
    AnySuccess,
}

impl Expect {
    pub fn accepts(self, status: u16) -> bool {
        match self {
            Expect::Status(expected) => status == expected,
            Expect::AnySuccess => (200..300).contains(&status),
        }
    }
}

/// Trait for resource-specific clients built on the shared gateway.
///
/// Implementors supply the gateway and a failure mapping; `dispatch` and
/// `decode` come for free.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// The resource-specific error type.
    type Error: From<GatewayError> + From<serde_json::Error> + Send;

    fn gateway(&self) -> &Gateway;

    /// Maps a response that did not meet the endpoint's [`Expect`].
    fn map_failure(response: ApiResponse) -> Self::Error;

    /// Sends `request` and returns the success body.
    #[tracing::instrument(skip_all, fields(method = %request.method, path = %request.path))]
    async fn dispatch(
        &self,
        request: ApiRequest,
        expect: Expect,
        cancel: Option<&CancelHandle>,
    ) -> Result<Value, Self::Error> {
        let response = match cancel {
            Some(cancel) => self.gateway().call_with_cancel(request, cancel).await?,
            None => self.gateway().call(request).await?,
        };
        match response {
            ApiResponse::Success { data, status } if expect.accepts(status) => Ok(data),
            other => {
                tracing::debug!(status = ?other.status(), "Rejected");
                Err(Self::map_failure(other))
            }
        }
    }

    fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Self::Error> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Status and message for a rejection: the body's `key` field, else `fallback`.
///
/// Calls that never got a status report [`UNKNOWN_ERROR`](crate::error::UNKNOWN_ERROR).
pub fn rejection(response: &ApiResponse, key: Option<&str>, fallback: &str) -> (Option<u16>, String) {
    match response.status() {
        None => (None, crate::error::UNKNOWN_ERROR.to_string()),
        Some(status) if response.is_success() => {
            (Some(status), crate::error::UNKNOWN_ERROR.to_string())
        }
        Some(status) => {
            let message = key
                .and_then(|key| response.error_message(key))
                .unwrap_or_else(|| fallback.to_string());
            (Some(status), message)
        }
    }
}
