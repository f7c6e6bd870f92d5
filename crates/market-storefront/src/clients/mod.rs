//! # Clients
//!
//! Typed wrappers over the shared [`Gateway`](market_gateway::Gateway), one per
//! backend resource.

pub mod admin_client;
pub mod api_client;
pub mod auth_client;
pub mod cart_client;
pub mod product_client;

pub use admin_client::AdminClient;
pub use api_client::{ApiClient, Expect};
pub use auth_client::AuthClient;
pub use cart_client::CartClient;
pub use product_client::ProductClient;
