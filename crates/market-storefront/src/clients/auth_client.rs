//! # Auth Client
//!
//! Login, logout and registration. The session cookie set by login lives in
//! the gateway's cookie jar, so every credentialed call after it is signed in.

use crate::clients::api_client::{rejection, ApiClient, Expect};
use crate::config::EndpointConfig;
use crate::error::AuthError;
use crate::model::{AuthProfile, Credentials, Registration};
use async_trait::async_trait;
use market_gateway::{ApiRequest, ApiResponse, CancelHandle, Gateway};
use std::sync::Arc;
use tracing::{info, instrument};

const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Clone)]
pub struct AuthClient {
    gateway: Gateway,
    endpoints: Arc<EndpointConfig>,
}

impl AuthClient {
    pub fn new(gateway: Gateway, endpoints: Arc<EndpointConfig>) -> Self {
        Self { gateway, endpoints }
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(
        &self,
        credentials: &Credentials,
        cancel: Option<&CancelHandle>,
    ) -> Result<AuthProfile, AuthError> {
        let request = ApiRequest::post(&self.endpoints.login).with_json(credentials)?;
        let data = self
            .dispatch(request, Expect::Status(200), cancel)
            .await
            .map_err(|e| relabel(e, "Login failed"))?;
        let profile: AuthProfile = Self::decode(data)?;
        info!(is_admin = profile.is_admin, "Logged in");
        Ok(profile)
    }

    #[instrument(skip_all)]
    pub async fn logout(&self, cancel: Option<&CancelHandle>) -> Result<(), AuthError> {
        let request = ApiRequest::post(&self.endpoints.logout).with_payload(serde_json::json!({}));
        self.dispatch(request, Expect::Status(204), cancel)
            .await
            .map_err(|e| relabel(e, "Logout failed"))?;
        info!("Logged out");
        Ok(())
    }

    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(
        &self,
        registration: &Registration,
        cancel: Option<&CancelHandle>,
    ) -> Result<AuthProfile, AuthError> {
        let request = ApiRequest::post(&self.endpoints.register).with_json(registration)?;
        let data = self.dispatch(request, Expect::Status(201), cancel).await?;
        let profile: AuthProfile = Self::decode(data)?;
        info!("Registered");
        Ok(profile)
    }
}

/// Login and logout report a fixed message whatever the body says.
fn relabel(error: AuthError, message: &str) -> AuthError {
    match error {
        AuthError::Rejected { status, .. } => AuthError::Rejected {
            status,
            message: message.to_string(),
        },
        other => other,
    }
}

#[async_trait]
impl ApiClient for AuthClient {
    type Error = AuthError;

    fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// A call that got no status at all still reads "Registration failed".
    fn map_failure(response: ApiResponse) -> Self::Error {
        let (status, message) = match response.status() {
            None => (None, REGISTRATION_FAILED.to_string()),
            Some(_) => rejection(&response, Some("detail"), REGISTRATION_FAILED),
        };
        AuthError::Rejected { status, message }
    }
}
