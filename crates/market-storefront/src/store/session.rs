use super::{KeyValueStore, StoreError};
use crate::state::{AuthState, CartState};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Key the session document is stored under.
pub const PERSIST_KEY: &str = "persist:root";

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub auth: AuthState,
    #[serde(default)]
    pub cart: CartState,
}

impl PersistedSession {
    /// Loads the saved session; an unreadable document is logged and ignored.
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        let Some(value) = store.get(PERSIST_KEY).await? else {
            return Ok(Self::default());
        };
        match serde_json::from_value(value) {
            Ok(session) => Ok(session),
            Err(error) => {
                warn!(%error, "Discarding unreadable persisted session");
                Ok(Self::default())
            }
        }
    }

    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(PERSIST_KEY, serde_json::to_value(self)?).await
    }
}
