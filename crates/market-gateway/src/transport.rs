//! # Transports
//!
//! The [`Transport`] trait is the seam between the gateway's resilience logic
//! and the wire. [`HttpTransport`] is the production implementation; the
//! [`mock`](crate::mock) module provides in-memory ones for tests.

use crate::config::GatewayConfig;
use crate::error::TransportError;
use crate::request::{Method, TransportRequest};
use crate::response::RawResponse;
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Sends one resolved request and reports what came back.
///
/// Implementations must be cancel-safe: the gateway drops the returned
/// future to abort a call.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport.
///
/// Two clients share one cookie jar so the session cookie set at login is
/// sent on credentialed calls and withheld on anonymous ones.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    credentialed: Client,
    anonymous: Client,
}

impl HttpTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());

        let mut credentialed = Client::builder().cookie_provider(jar);
        let mut anonymous = Client::builder();
        if let Some(timeout) = config.timeout() {
            credentialed = credentialed.timeout(timeout);
            anonymous = anonymous.timeout(timeout);
        }

        Ok(Self {
            credentialed: credentialed.build().map_err(map_reqwest_error)?,
            anonymous: anonymous.build().map_err(map_reqwest_error)?,
        })
    }

    fn client(&self, with_credentials: bool) -> &Client {
        if with_credentials {
            &self.credentialed
        } else {
            &self.anonymous
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client(request.with_credentials)
            .request(to_reqwest_method(request.method), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        debug!(status, len = bytes.len(), "Response received");

        Ok(RawResponse::new(status, parse_body(&bytes)))
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

/// Empty bodies become `None`; anything that is not JSON is kept as text.
fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}
