//! # Lifecycle
//!
//! [`Storefront`] wires the gateway, the persisted store, the API clients and
//! the session actor together, and tears them down again.
//!
//! ```text
//! StorefrontConfig ──► Gateway (one breaker) ──► AuthClient, CartClient ──► SessionActor (task)
//!                                            └─► ProductClient, AdminClient
//! KeyValueStore ─────► PersistedSession ─────────────────────────────────────┘
//! ```
//!
//! Logging is set up separately with
//! [`setup_tracing`](market_gateway::tracing::setup_tracing).

pub mod storefront;

pub use storefront::*;
