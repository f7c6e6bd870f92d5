//! # Session Actor
//!
//! One task owns the signed-in state and both carts. Requests arrive over an
//! `mpsc` channel and are handled to completion one at a time, so a login's
//! merge can never interleave with an add from another caller.
//!
//! ## Structure
//!
//! - [`actor`] - [`SessionActor`] and its event loop
//! - [`message`] - [`SessionRequest`] and reply types
//! - [`client`] - [`SessionClient`], the typed handle callers use
//! - [`error`] - [`SessionError`]
//!
//! ## Usage
//!
//! ```rust
//! use market_gateway::mock::MockTransport;
//! use market_gateway::{Gateway, GatewayConfig};
//! use market_storefront::clients::{AuthClient, CartClient};
//! use market_storefront::config::EndpointConfig;
//! use market_storefront::model::CartItem;
//! use market_storefront::session;
//! use market_storefront::store::{MemoryStore, PersistedSession};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Gateway::new(GatewayConfig::default(), MockTransport::new());
//! let endpoints = Arc::new(EndpointConfig::default());
//! let (actor, client) = session::new(
//!     32,
//!     PersistedSession::default(),
//!     Arc::new(MemoryStore::new()),
//!     AuthClient::new(gateway.clone(), endpoints.clone()),
//!     CartClient::new(gateway, endpoints),
//! );
//! tokio::spawn(actor.run());
//!
//! // Signed out: only the guest cart changes, nothing is sent.
//! client.add_item(CartItem::new(7, 2)).await?;
//! assert_eq!(client.snapshot().await?.cart.guest_items.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod client;
pub mod error;
pub mod message;

pub use actor::SessionActor;
pub use client::SessionClient;
pub use error::SessionError;
pub use message::{LoginReport, SessionRequest, SessionState};

use crate::clients::{AuthClient, CartClient};
use crate::store::{KeyValueStore, PersistedSession};
use std::sync::Arc;

/// Creates a session actor seeded with `state` and its client.
pub fn new(
    buffer_size: usize,
    state: PersistedSession,
    store: Arc<dyn KeyValueStore>,
    auth: AuthClient,
    cart: CartClient,
) -> (SessionActor, SessionClient) {
    let (actor, sender) = SessionActor::new(buffer_size, state, store, auth, cart);
    (actor, SessionClient::new(sender))
}
