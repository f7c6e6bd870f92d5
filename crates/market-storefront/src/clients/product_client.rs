//! # Product Client
//!
//! Catalogue reads and admin writes against `{products}/{endpoint}/`.
//!
//! Listings are paginated server-side; [`ProductClient::list`] returns one
//! [`ProductPage`] and the `page` query parameter selects which.

use crate::clients::api_client::{rejection, ApiClient, Expect};
use crate::config::EndpointConfig;
use crate::error::{ProductError, GENERIC_ERROR};
use crate::model::{Category, Product, ProductIdentifier, ProductPage, ProductQuery};
use async_trait::async_trait;
use market_gateway::{ApiRequest, ApiResponse, CancelHandle, Gateway, Method};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Default viewset under the products route.
pub const PRODUCTS_VIEWSET: &str = "products_viewsets";

pub const CATEGORIES_VIEWSET: &str = "categories";

#[derive(Clone)]
pub struct ProductClient {
    gateway: Gateway,
    endpoints: Arc<EndpointConfig>,
    viewset: String,
}

impl ProductClient {
    pub fn new(gateway: Gateway, endpoints: Arc<EndpointConfig>) -> Self {
        Self {
            gateway,
            endpoints,
            viewset: PRODUCTS_VIEWSET.to_string(),
        }
    }

    /// Targets another viewset under the products route.
    pub fn with_viewset(mut self, viewset: impl Into<String>) -> Self {
        self.viewset = viewset.into();
        self
    }

    fn path(&self, pk: Option<ProductIdentifier>, suffix: &str) -> String {
        let base = self.endpoints.products.trim_end_matches('/');
        match pk {
            Some(pk) => format!("{base}/{}/{pk}/{suffix}", self.viewset),
            None => format!("{base}/{}/{suffix}", self.viewset),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: String,
        payload: Option<Value>,
        cancel: Option<&CancelHandle>,
    ) -> Result<Value, ProductError> {
        let mut request = ApiRequest::new(method, path);
        if let Some(payload) = payload {
            request = request.with_payload(payload);
        }
        self.dispatch(request, Expect::Status(200), cancel).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(
        &self,
        query: &ProductQuery,
        cancel: Option<&CancelHandle>,
    ) -> Result<ProductPage, ProductError> {
        let mut request = ApiRequest::get(self.path(None, ""));
        for (key, value) in query {
            request = request.with_query(key.as_str(), value.as_str());
        }
        let data = self.dispatch(request, Expect::Status(200), cancel).await?;
        Ok(Self::decode(data)?)
    }

    /// Every category, unpaginated.
    #[instrument(skip_all)]
    pub async fn categories(&self, cancel: Option<&CancelHandle>) -> Result<Vec<Category>, ProductError> {
        let base = self.endpoints.products.trim_end_matches('/');
        let path = format!("{base}/{CATEGORIES_VIEWSET}/");
        let data = self.send(Method::Get, path, None, cancel).await?;
        Ok(Self::decode(data)?)
    }

    #[instrument(skip(self, cancel))]
    pub async fn get(
        &self,
        pk: ProductIdentifier,
        cancel: Option<&CancelHandle>,
    ) -> Result<Product, ProductError> {
        let data = self
            .send(Method::Get, self.path(Some(pk), ""), None, cancel)
            .await?;
        Ok(Self::decode(data)?)
    }

    /// The eight featured products.
    #[instrument(skip_all)]
    pub async fn star_eight(&self, cancel: Option<&CancelHandle>) -> Result<Vec<Product>, ProductError> {
        let data = self
            .send(Method::Get, self.path(None, "star_eight/"), None, cancel)
            .await?;
        Ok(Self::decode(data)?)
    }

    #[instrument(skip_all)]
    pub async fn create(&self, product: &Product, cancel: Option<&CancelHandle>) -> Result<Value, ProductError> {
        let payload = serde_json::to_value(product)?;
        self.send(Method::Post, self.path(None, ""), Some(payload), cancel)
            .await
    }

    #[instrument(skip(self, product, cancel))]
    pub async fn update(
        &self,
        pk: ProductIdentifier,
        product: &Product,
        cancel: Option<&CancelHandle>,
    ) -> Result<Value, ProductError> {
        let payload = serde_json::to_value(product)?;
        self.send(Method::Put, self.path(Some(pk), ""), Some(payload), cancel)
            .await
    }

    #[instrument(skip(self, cancel))]
    pub async fn delete(&self, pk: ProductIdentifier, cancel: Option<&CancelHandle>) -> Result<(), ProductError> {
        self.send(Method::Delete, self.path(Some(pk), ""), None, cancel)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ApiClient for ProductClient {
    type Error = ProductError;

    fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    fn map_failure(response: ApiResponse) -> Self::Error {
        let (status, message) = rejection(&response, Some("error"), GENERIC_ERROR);
        ProductError::Rejected { status, message }
    }
}
