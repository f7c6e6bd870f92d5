//! # Session State
//!
//! Pure reducers for the two pieces of client state. They never talk to the
//! backend; the session actor calls them after the server has agreed.

pub mod auth;
pub mod cart;

pub use auth::AuthState;
pub use cart::{CartScope, CartState};
