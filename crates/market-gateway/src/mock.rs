//! # Mock Transports & Testing Guide
//!
//! Two in-memory [`Transport`] implementations for exercising the gateway and
//! the API clients without a server.
//!
//! | Feature | MockTransport | ChannelTransport |
//! |---------|---------------|------------------|
//! | **Replies** | Queued up front | Sent by the test, one at a time |
//! | **Timing** | Immediate | Held until the test answers |
//! | **Use Case** | Client logic, breaker trips | Cancellation, in-flight ordering |
//!
//! ## Pattern 1: expectation queue
//!
//! ```rust
//! use market_gateway::mock::MockTransport;
//! use market_gateway::{ApiRequest, Gateway, GatewayConfig, Method};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mock = MockTransport::new();
//! mock.expect(Method::Get, "/products/products_viewsets/")
//!     .respond(200, json!([]));
//!
//! let gateway = Gateway::new(GatewayConfig::default(), mock.clone());
//! let response = gateway
//!     .call(ApiRequest::get("/products/products_viewsets/"))
//!     .await
//!     .unwrap();
//! assert!(response.is_success());
//! mock.verify();
//! # }
//! ```
//!
//! ## Pattern 2: hold a call in flight
//!
//! Use [`create_mock_transport`] and answer with [`expect_request`]. Until the
//! test sends on the responder the call stays pending, so the test can cancel
//! it or assert that nothing else was issued meanwhile.

use crate::error::TransportError;
use crate::request::{Method, TransportRequest};
use crate::response::RawResponse;
use crate::transport::Transport;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Expectation {
    method: Method,
    path: String,
    reply: Result<RawResponse, TransportError>,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    calls: Vec<TransportRequest>,
}

/// A transport with expectation tracking for fluent testing.
///
/// Clones share the queue, so keep one clone in the test and hand the other
/// to the gateway.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Expects the next request to be `method` on a URL ending in `path`.
    pub fn expect(&self, method: Method, path: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            method,
            path: path.into(),
            state: self.state.clone(),
        }
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<TransportRequest> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        let mut state = self.lock();
        state.calls.push(request.clone());
        let Some(expectation) = state.expectations.pop_front() else {
            drop(state);
            panic!("Unexpected request: {} {}", request.method, request.url);
        };
        drop(state);

        if expectation.method != request.method || !request.url.ends_with(&expectation.path) {
            panic!(
                "Expectation mismatch: expected {} {}, got {} {}",
                expectation.method, expectation.path, request.method, request.url
            );
        }
        expectation.reply
    }
}

/// Builder for one queued reply.
pub struct ExpectationBuilder {
    method: Method,
    path: String,
    state: Arc<Mutex<MockState>>,
}

impl ExpectationBuilder {
    fn push(self, reply: Result<RawResponse, TransportError>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.expectations.push_back(Expectation {
            method: self.method,
            path: self.path,
            reply,
        });
    }

    pub fn respond(self, status: u16, body: Value) {
        self.push(Ok(RawResponse::new(status, Some(body))));
    }

    pub fn respond_empty(self, status: u16) {
        self.push(Ok(RawResponse::new(status, None)));
    }

    /// Simulates a request that never got a response.
    pub fn fail(self, error: TransportError) {
        self.push(Err(error));
    }
}

// =============================================================================
// CHANNEL HELPERS
// =============================================================================

/// Reply slot for a request captured by [`ChannelTransport`].
pub type Responder = oneshot::Sender<Result<RawResponse, TransportError>>;

/// Forwards every request to a channel and waits for the test to answer.
#[derive(Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<(TransportRequest, Responder)>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send((request, respond_to))
            .await
            .map_err(|_| TransportError::Other("mock receiver dropped".into()))?;
        response
            .await
            .map_err(|_| TransportError::Other("mock responder dropped".into()))?
    }
}

/// Creates a channel-backed transport and the receiver the test drives it with.
pub fn create_mock_transport(
    buffer_size: usize,
) -> (ChannelTransport, mpsc::Receiver<(TransportRequest, Responder)>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelTransport { sender }, receiver)
}

/// Waits for the next request sent through a [`ChannelTransport`].
pub async fn expect_request(
    receiver: &mut mpsc::Receiver<(TransportRequest, Responder)>,
) -> Option<(TransportRequest, Responder)> {
    receiver.recv().await
}
