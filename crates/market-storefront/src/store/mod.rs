//! # Persisted Store
//!
//! A small key-value seam for what must survive a restart: the auth flags and
//! both carts. [`MemoryStore`] backs tests and ephemeral runs;
//! [`JsonFileStore`] writes one JSON document to disk.

pub mod error;
pub mod file;
pub mod memory;
pub mod session;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use session::{PersistedSession, PERSIST_KEY};

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
