//! # Gateway Configuration
//!
//! Plain serde structs. Loading them from files and the environment is the
//! application's job (see `market_storefront::config`); every field has a
//! default so a partial document deserializes cleanly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Settings for the gateway's circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures that trip the circuit.
    pub failure_threshold: u32,
    /// Base window; each opening doubles the current window, so the first lasts twice this.
    pub initial_retry_delay_ms: u64,
    /// Upper bound for the doubled window.
    pub max_retry_delay_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 15,
            initial_retry_delay_ms: 1_000,
            max_retry_delay_ms: 30_000,
        }
    }
}

impl BreakerConfig {
    pub fn initial_retry_delay(&self) -> Duration {
        Duration::from_millis(self.initial_retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms.max(self.initial_retry_delay_ms))
    }
}

/// Settings for a [`Gateway`](crate::Gateway).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Prefix joined with every request path.
    pub base_url: String,
    /// Attach session cookies unless a request overrides it.
    pub with_credentials: bool,
    /// Client-level timeout. `None` leaves it to the HTTP client.
    pub timeout_ms: Option<u64>,
    /// Headers sent with every request; per-request headers win.
    pub default_headers: BTreeMap<String, String>,
    pub breaker: BreakerConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            with_credentials: true,
            timeout_ms: None,
            default_headers: BTreeMap::new(),
            breaker: BreakerConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
