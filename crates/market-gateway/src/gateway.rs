//! # Gateway
//!
//! Every outbound API call goes through [`Gateway::call_with_cancel`]. The
//! gateway resolves the URL, asks the breaker for admission, races the
//! transport against the caller's [`CancelHandle`], and folds the result into
//! an [`ApiResponse`].

use crate::breaker::{CircuitBreaker, CircuitSnapshot};
use crate::cancel::CancelHandle;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, TransportError};
use crate::request::{join_url, ApiRequest, TransportRequest};
use crate::response::ApiResponse;
use crate::transport::{HttpTransport, Transport};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Resilient request gateway.
///
/// Cheap to clone; clones share the transport and the breaker.
#[derive(Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn Transport>,
    breaker: Arc<CircuitBreaker>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.config.base_url)
            .field("breaker", &self.breaker.snapshot())
            .finish()
    }
}

impl Gateway {
    pub fn new(config: GatewayConfig, transport: impl Transport) -> Self {
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn Transport>) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));
        Self {
            config: Arc::new(config),
            transport,
            breaker,
        }
    }

    /// Gateway over a real HTTP client.
    pub fn http(config: GatewayConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, transport))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        self.breaker.snapshot()
    }

    pub fn is_circuit_open(&self) -> bool {
        self.breaker.is_open()
    }

    /// Issues `request` with a fresh, never-cancelled handle.
    pub async fn call(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        self.call_with_cancel(request, &CancelHandle::new()).await
    }

    /// Issues `request`, aborting it if `cancel` fires first.
    ///
    /// Returns `Err` only for [`GatewayError::CircuitOpen`] (transport not
    /// touched) and [`GatewayError::Cancelled`] (breaker untouched). Every
    /// other outcome, including network failures, is an [`ApiResponse`].
    ///
    /// Dropping the returned future mid-flight counts the same as cancelling
    /// through `cancel`.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn call_with_cancel(
        &self,
        request: ApiRequest,
        cancel: &CancelHandle,
    ) -> Result<ApiResponse, GatewayError> {
        if cancel.is_cancelled() {
            debug!("Cancelled before dispatch");
            return Err(GatewayError::Cancelled);
        }

        let admission = self.breaker.admit()?;
        let transport_request = self.resolve(request);
        let url = transport_request.url.clone();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.transport.send(transport_request) => Some(result),
        };

        match outcome {
            None => {
                drop(admission);
                debug!(%url, "Cancelled in flight");
                Err(GatewayError::Cancelled)
            }
            Some(Ok(raw)) if raw.is_success() => {
                admission.succeed();
                debug!(%url, status = raw.status, "Call succeeded");
                Ok(ApiResponse::Success {
                    data: raw.body.unwrap_or(Value::Null),
                    status: raw.status,
                })
            }
            Some(Ok(raw)) => {
                admission.fail();
                debug!(%url, status = raw.status, "Call failed");
                Ok(ApiResponse::Failure {
                    error: raw.body,
                    status: Some(raw.status),
                })
            }
            Some(Err(error)) => {
                admission.fail();
                warn!(%url, %error, "Transport error");
                Ok(ApiResponse::Failure {
                    error: None,
                    status: None,
                })
            }
        }
    }

    fn resolve(&self, request: ApiRequest) -> TransportRequest {
        let mut headers = self.config.default_headers.clone();
        headers.extend(request.options.headers);
        TransportRequest {
            method: request.method,
            url: self.url_for(&request.path),
            payload: request.payload,
            headers,
            query: request.options.query,
            with_credentials: request
                .options
                .with_credentials
                .unwrap_or(self.config.with_credentials),
        }
    }
}
