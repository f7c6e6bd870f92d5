//! # Domain Models
//!
//! Plain serde data exchanged with the backend. Field names follow the
//! backend's JSON so the types round-trip without renames.

pub mod admin;
pub mod cart;
pub mod product;
pub mod user;

pub use admin::*;
pub use cart::*;
pub use product::*;
pub use user::*;
