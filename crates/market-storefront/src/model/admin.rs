use market_gateway::Method;
use serde_json::Value;

/// One call against the admin users resource.
///
/// Routing:
///
/// - `DELETE` with an identifier: `users/{identifier}/`
/// - identifier and action: `users/{identifier}/{action}/`
/// - otherwise: `users/{endpoint}/`, or `users/` when `endpoint` is empty
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUserAction {
    pub endpoint: String,
    pub identifier: String,
    pub action: String,
    pub method: Method,
    pub data: Value,
    pub params: Vec<(String, String)>,
}

impl Default for AdminUserAction {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            identifier: String::new(),
            action: String::new(),
            method: Method::Get,
            data: Value::Object(Default::default()),
            params: Vec::new(),
        }
    }
}

impl AdminUserAction {
    /// Path relative to the users base route.
    pub fn relative_path(&self) -> String {
        if self.method == Method::Delete && !self.identifier.is_empty() {
            format!("{}/", self.identifier)
        } else if !self.identifier.is_empty() && !self.action.is_empty() {
            format!("{}/{}/", self.identifier, self.action)
        } else if !self.endpoint.is_empty() {
            format!("{}/", self.endpoint)
        } else {
            String::new()
        }
    }

    /// Whether the payload travels in the body.
    pub fn sends_body(&self) -> bool {
        matches!(self.method, Method::Post | Method::Patch | Method::Delete)
    }
}
