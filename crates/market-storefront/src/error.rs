//! Error types for the API clients and the storefront as a whole.

use crate::config::ConfigError;
use crate::session::SessionError;
use crate::store::StoreError;
use market_gateway::{GatewayError, TransportError};
use thiserror::Error;

/// Fallback when a failure body has no usable message.
pub const GENERIC_ERROR: &str = "Something went wrong";

/// Message for calls that never got a status back.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// Errors from [`AuthClient`](crate::clients::AuthClient).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The backend answered but not with the expected status.
    #[error("{message} (status {status:?})")]
    Rejected { status: Option<u16>, message: String },

    #[error("Malformed auth response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from [`CartClient`](crate::clients::CartClient).
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{message} (status {status:?})")]
    Rejected { status: Option<u16>, message: String },

    #[error("Malformed cart response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from [`ProductClient`](crate::clients::ProductClient).
#[derive(Debug, Error)]
pub enum ProductError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{message} (status {status:?})")]
    Rejected { status: Option<u16>, message: String },

    #[error("Malformed product response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from [`AdminClient`](crate::clients::AdminClient).
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Carries the raw failure body, as admin screens show it verbatim.
    #[error("{message} (status {status:?})")]
    Rejected {
        status: Option<u16>,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("Malformed admin response: {0}")]
    Decode(#[from] serde_json::Error),
}

macro_rules! rejected_accessors {
    ($($error:ident),*) => {$(
        impl $error {
            /// HTTP status of a rejection, if the backend sent one.
            pub fn status(&self) -> Option<u16> {
                match self {
                    $error::Rejected { status, .. } => *status,
                    _ => None,
                }
            }

            pub fn is_circuit_open(&self) -> bool {
                matches!(self, $error::Gateway(e) if e.is_circuit_open())
            }

            pub fn is_cancelled(&self) -> bool {
                matches!(self, $error::Gateway(e) if e.is_cancelled())
            }
        }
    )*};
}

rejected_accessors!(AuthError, CartError, ProductError, AdminError);

/// Top-level error for building and running a [`Storefront`](crate::lifecycle::Storefront).
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP transport: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Session task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use std::path::Path;

    async fn start(path: &Path) -> Result<(), StorefrontError> {
        StorefrontConfig::load(Some(path))?;
        Ok(())
    }

    async fn ask(result: Result<(), SessionError>) -> Result<(), StorefrontError> {
        result?;
        Ok(())
    }

    #[tokio::test]
    async fn startup_and_session_failures_lift_into_storefront_error() {
        let missing = start(Path::new("/nonexistent/market.toml")).await;
        assert!(matches!(
            missing,
            Err(StorefrontError::Config(ConfigError::FileNotFound(_)))
        ));

        let closed = ask(Err(SessionError::Closed)).await.unwrap_err();
        assert!(matches!(closed, StorefrontError::Session(SessionError::Closed)));
        assert_eq!(closed.to_string(), "Session actor closed");
    }
}
