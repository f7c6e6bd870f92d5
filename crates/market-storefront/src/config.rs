//! # Configuration
//!
//! Layered loading with the `config` crate:
//!
//! 1. Built-in defaults ([`StorefrontConfig::default`])
//! 2. An optional TOML/JSON/YAML file
//! 3. `MARKET_*` environment variables, `__` for nesting
//!
//! ```bash
//! MARKET_GATEWAY__BASE_URL=https://api.example.com \
//! MARKET_GATEWAY__BREAKER__FAILURE_THRESHOLD=5 \
//! cargo run -p market-storefront
//! ```

use config::{Config, Environment, File, FileFormat};
use market_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PREFIX: &str = "MARKET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to encode defaults: {0}")]
    Defaults(#[from] serde_json::Error),
}

/// Backend routes. `:id` in a template is replaced with the product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub login: String,
    pub logout: String,
    pub register: String,
    pub cart_add: String,
    pub cart_remove: String,
    pub cart_clear: String,
    pub cart_merge_sync: String,
    pub cart_update_quantity: String,
    pub products: String,
    pub admin_auth_check: String,
    pub admin_users: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            login: "/user/login/".into(),
            logout: "/user/logout/".into(),
            register: "/user/register/".into(),
            cart_add: "/cart/cart_operations/add-item-to-cart/".into(),
            cart_remove: "/cart/cart_operations/:id/remove-item-from-cart/".into(),
            cart_clear: "/cart/cart_operations/clear-entire-cart/".into(),
            cart_merge_sync: "/cart/cart_operations/merge-and-sync-carts/".into(),
            cart_update_quantity: "/cart/cart_operations/:id/update-item-quantity/".into(),
            products: "/products".into(),
            admin_auth_check: "/admin/admin-only-pages-auth-check/".into(),
            admin_users: "/admin/users/".into(),
        }
    }
}

/// Fills the `:id` placeholder of a route template.
pub fn with_id(template: &str, id: impl std::fmt::Display) -> String {
    template.replace(":id", &id.to_string())
}

/// Where the persisted session lives. `None` keeps it in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Capacity of the session actor's mailbox.
    pub buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { buffer_size: 32 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub gateway: GatewayConfig,
    pub endpoints: EndpointConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
}

impl StorefrontConfig {
    /// Loads defaults, then `path` if given, then `MARKET_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load) but reads variables from `env` instead of the process.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let defaults = serde_json::to_string(&Self::default())?;
        let mut builder = Config::builder().add_source(File::from_str(&defaults, FileFormat::Json));

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
