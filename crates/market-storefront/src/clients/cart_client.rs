//! # Cart Client
//!
//! Server-side cart operations for a signed-in user. Every endpoint answers
//! 200 on success; failures carry the backend's `error` field.

use crate::clients::api_client::{rejection, ApiClient, Expect};
use crate::config::{with_id, EndpointConfig};
use crate::error::{CartError, GENERIC_ERROR};
use crate::model::{CartItem, ProductIdentifier};
use crate::reconcile::CartBackend;
use async_trait::async_trait;
use market_gateway::{ApiRequest, ApiResponse, CancelHandle, Gateway};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct CartClient {
    gateway: Gateway,
    endpoints: Arc<EndpointConfig>,
}

impl CartClient {
    pub fn new(gateway: Gateway, endpoints: Arc<EndpointConfig>) -> Self {
        Self { gateway, endpoints }
    }

    async fn send(
        &self,
        request: ApiRequest,
        cancel: Option<&CancelHandle>,
    ) -> Result<serde_json::Value, CartError> {
        self.dispatch(request, Expect::Status(200), cancel).await
    }

    /// The signed-in user's cart, as the merge-and-sync endpoint reports it.
    #[instrument(skip_all)]
    pub async fn fetch_cart(&self, cancel: Option<&CancelHandle>) -> Result<Vec<CartItem>, CartError> {
        let data = self
            .send(ApiRequest::get(&self.endpoints.cart_merge_sync), cancel)
            .await?;
        let items: Vec<CartItem> = Self::decode(data)?;
        debug!(count = items.len(), "Fetched cart");
        Ok(items)
    }

    /// Adds `item`; the returned line is what the server now holds.
    #[instrument(skip_all, fields(product = %item.product_identifier, quantity = item.quantity))]
    pub async fn add_item(
        &self,
        item: &CartItem,
        cancel: Option<&CancelHandle>,
    ) -> Result<CartItem, CartError> {
        let request = ApiRequest::post(&self.endpoints.cart_add).with_json(item)?;
        let data = self.send(request, cancel).await?;
        Ok(Self::decode(data)?)
    }

    #[instrument(skip(self, cancel))]
    pub async fn remove_item(
        &self,
        product: ProductIdentifier,
        cancel: Option<&CancelHandle>,
    ) -> Result<(), CartError> {
        let request = ApiRequest::delete(with_id(&self.endpoints.cart_remove, product))
            .with_payload(json!({ "product_identifier": product }));
        self.send(request, cancel).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn clear(&self, cancel: Option<&CancelHandle>) -> Result<(), CartError> {
        self.send(ApiRequest::delete(&self.endpoints.cart_clear), cancel)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, cancel))]
    pub async fn update_quantity(
        &self,
        product: ProductIdentifier,
        quantity: u32,
        cancel: Option<&CancelHandle>,
    ) -> Result<(), CartError> {
        let request = ApiRequest::patch(with_id(&self.endpoints.cart_update_quantity, product))
            .with_payload(json!({ "product_identifier": product, "quantity": quantity }));
        self.send(request, cancel).await?;
        Ok(())
    }
}

#[async_trait]
impl ApiClient for CartClient {
    type Error = CartError;

    fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    fn map_failure(response: ApiResponse) -> Self::Error {
        let (status, message) = rejection(&response, Some("error"), GENERIC_ERROR);
        CartError::Rejected { status, message }
    }
}

#[async_trait]
impl CartBackend for CartClient {
    type Error = CartError;

    async fn fetch_cart(&self) -> Result<Vec<CartItem>, CartError> {
        CartClient::fetch_cart(self, None).await
    }

    async fn add_item(&self, item: &CartItem) -> Result<CartItem, CartError> {
        CartClient::add_item(self, item, None).await
    }
}
