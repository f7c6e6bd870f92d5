//! # Responses
//!
//! [`ApiResponse`] is the tagged result every gateway call resolves to. It
//! keeps "the backend said no" out of the `Err` channel, which is reserved for
//! [`GatewayError`](crate::GatewayError).

use serde::de::DeserializeOwned;
use serde_json::Value;

/// What a [`Transport`](crate::transport::Transport) got back from the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl RawResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outcome of a gateway call that reached (or tried to reach) the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Success {
        data: Value,
        status: u16,
    },
    /// `status` and `error` are `None` when the request never got a response.
    Failure {
        error: Option<Value>,
        status: Option<u16>,
    },
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiResponse::Success { status, .. } => Some(*status),
            ApiResponse::Failure { status, .. } => *status,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiResponse::Success { data, .. } => Some(data),
            ApiResponse::Failure { .. } => None,
        }
    }

    /// Reads a string field such as `error` or `detail` from a failure body.
    pub fn error_message(&self, key: &str) -> Option<String> {
        match self {
            ApiResponse::Failure {
                error: Some(body), ..
            } => match body.get(key) {
                Some(Value::String(message)) => Some(message.clone()),
                Some(other) => Some(other.to_string()),
                None => None,
            },
            _ => None,
        }
    }

    /// Deserializes the success payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.data().map(|data| T::deserialize(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_range_is_2xx() {
        assert!(RawResponse::new(204, None).is_success());
        assert!(!RawResponse::new(304, None).is_success());
        assert!(!RawResponse::new(199, None).is_success());
    }

    #[test]
    fn error_message_reads_named_field() {
        let failure = ApiResponse::Failure {
            error: Some(json!({"error": "Product not found"})),
            status: Some(404),
        };
        assert_eq!(
            failure.error_message("error").as_deref(),
            Some("Product not found")
        );
        assert_eq!(failure.error_message("detail"), None);
        assert_eq!(failure.status(), Some(404));
    }

    #[test]
    fn network_failure_has_no_status() {
        let failure = ApiResponse::Failure {
            error: None,
            status: None,
        };
        assert_eq!(failure.status(), None);
        assert_eq!(failure.error_message("error"), None);
    }
}
