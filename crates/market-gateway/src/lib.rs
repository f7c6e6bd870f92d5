//! # Market Gateway
//!
//! The request layer every storefront API call goes through. A [`Gateway`]
//! wraps a [`Transport`](transport::Transport) with a shared
//! [`CircuitBreaker`](breaker::CircuitBreaker) and per-call cancellation.
//!
//! ## Architecture Overview
//!
//! 1. **Request Layer** ([`ApiRequest`]): method, path, optional JSON payload, options
//! 2. **Resilience Layer** ([`Gateway`]): breaker admission, cancellation race, outcome folding
//! 3. **Wire Layer** ([`Transport`](transport::Transport)): reqwest in production, [`mock`] in tests
//!
//! ## Outcomes
//!
//! A call resolves to one of:
//!
//! - `Ok(ApiResponse::Success { .. })` for any 2xx
//! - `Ok(ApiResponse::Failure { .. })` for non-2xx or a network error (counted by the breaker)
//! - `Err(GatewayError::CircuitOpen { .. })` without touching the transport
//! - `Err(GatewayError::Cancelled)` without touching the breaker
//!
//! ```rust
//! use market_gateway::mock::MockTransport;
//! use market_gateway::{ApiRequest, Gateway, GatewayConfig, Method};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mock = MockTransport::new();
//! mock.expect(Method::Post, "/user/login/")
//!     .respond(401, json!({"detail": "Invalid credentials"}));
//!
//! let gateway = Gateway::new(GatewayConfig::default(), mock);
//! let response = gateway.call(ApiRequest::post("/user/login/")).await.unwrap();
//! assert_eq!(response.status(), Some(401));
//! assert_eq!(gateway.snapshot().failure_count, 1);
//! # }
//! ```

pub mod breaker;
pub mod cancel;
pub mod config;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod request;
pub mod response;
pub mod tracing;
pub mod transport;

// Re-export core types for convenience
pub use breaker::{CircuitSnapshot, CircuitState};
pub use cancel::CancelHandle;
pub use config::{BreakerConfig, GatewayConfig};
pub use error::{GatewayError, TransportError};
pub use gateway::Gateway;
pub use request::{ApiRequest, Method, RequestOptions};
pub use response::{ApiResponse, RawResponse};
