//! # Market Storefront
//!
//! The client side of the marketplace: typed API clients over the
//! [`market_gateway`] request layer, the guest/auth cart state, and the
//! login-time cart merge.
//!
//! ## Core Components
//!
//! - **[model]**: serde types matching the backend's JSON
//! - **[clients]**: one client per backend resource, all sharing one gateway
//! - **[reconcile]**: [`merge_guest_cart`](reconcile::merge_guest_cart)
//! - **[state]**: pure cart and auth reducers
//! - **[store]**: persistence for what survives a restart
//! - **[session]**: the actor that serializes auth and cart changes
//! - **[lifecycle]**: [`Storefront`](lifecycle::Storefront), which starts and stops it all
//!
//! ## Testing
//!
//! See [`market_gateway::mock`] for transports that let the whole stack run
//! without a server.

pub mod clients;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod state;
pub mod store;
