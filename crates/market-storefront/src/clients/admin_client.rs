//! # Admin Client
//!
//! Gatekeeping for admin pages and the users management resource.

use crate::clients::api_client::{rejection, ApiClient, Expect};
use crate::config::EndpointConfig;
use crate::error::AdminError;
use crate::model::AdminUserAction;
use async_trait::async_trait;
use market_gateway::{ApiRequest, ApiResponse, CancelHandle, Gateway};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

const CHECK_FAILED: &str = "Admin check failed or token validation failed";

#[derive(Clone)]
pub struct AdminClient {
    gateway: Gateway,
    endpoints: Arc<EndpointConfig>,
}

impl AdminClient {
    pub fn new(gateway: Gateway, endpoints: Arc<EndpointConfig>) -> Self {
        Self { gateway, endpoints }
    }

    /// Asks the backend whether the signed-in user may see admin pages.
    #[instrument(skip_all)]
    pub async fn check_access(&self, cancel: Option<&CancelHandle>) -> Result<Value, AdminError> {
        let request = ApiRequest::post(&self.endpoints.admin_auth_check).with_payload(json!({}));
        self.dispatch(request, Expect::Status(200), cancel)
            .await
            .map_err(|error| match error {
                AdminError::Rejected { status, body, .. } => AdminError::Rejected {
                    status,
                    message: CHECK_FAILED.to_string(),
                    body,
                },
                other => other,
            })
    }

    #[instrument(skip_all, fields(method = %action.method, identifier = %action.identifier))]
    pub async fn user_action(
        &self,
        action: &AdminUserAction,
        cancel: Option<&CancelHandle>,
    ) -> Result<Value, AdminError> {
        let base = self.endpoints.admin_users.trim_end_matches('/');
        let mut request = ApiRequest::new(action.method, format!("{base}/{}", action.relative_path()));
        for (key, value) in &action.params {
            request = request.with_query(key.as_str(), value.as_str());
        }
        if action.sends_body() {
            request = request.with_payload(action.data.clone());
        }
        self.dispatch(request, Expect::AnySuccess, cancel).await
    }
}

#[async_trait]
impl ApiClient for AdminClient {
    type Error = AdminError;

    fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    fn map_failure(response: ApiResponse) -> Self::Error {
        let (status, message) = rejection(&response, Some("detail"), crate::error::GENERIC_ERROR);
        let body = match response {
            ApiResponse::Failure { error, .. } => error,
            ApiResponse::Success { data, .. } => Some(data),
        };
        AdminError::Rejected {
            status,
            message,
            body,
        }
    }
}
