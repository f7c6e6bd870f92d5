//! # Requests
//!
//! [`ApiRequest`] is what callers build; [`TransportRequest`] is the fully
//! resolved call the gateway hands to a [`Transport`](crate::transport::Transport).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// HTTP verbs the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// Per-request overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    /// Overrides [`GatewayConfig::with_credentials`](crate::GatewayConfig::with_credentials).
    pub with_credentials: Option<bool>,
    pub query: Vec<(String, String)>,
}

/// A call described relative to the gateway's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub payload: Option<Value>,
    pub options: RequestOptions,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            payload: None,
            options: RequestOptions::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Serializes `payload` into the request body.
    pub fn with_json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, crate::GatewayError> {
        let value = serde_json::to_value(payload)
            .map_err(|e| crate::GatewayError::InvalidRequest(e.to_string()))?;
        Ok(self.with_payload(value))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.options.with_credentials = Some(with_credentials);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.query.push((key.into(), value.into()));
        self
    }
}

/// A fully resolved call: absolute URL, merged headers, credentials decided.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub payload: Option<Value>,
    pub headers: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    pub with_credentials: bool,
}

/// Joins `base` and `path` with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
