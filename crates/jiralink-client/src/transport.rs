//! Transport abstraction for the remote service.
//!
//! The client talks to the server through two channels:
//! - named RPC calls that take a session token as their first argument
//! - REST requests authenticated by the transport itself
//!
//! Keeping both behind [`Transport`] lets the services run against a mock in tests.

use serde_json::Value;
use std::fmt;

use crate::fault::RemoteFault;
use crate::session::Authenticator;

/// HTTP method of a REST request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A REST request relative to the server URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: Method,
    /// Resource path, e.g. `rest/api/2/myself`.
    pub resource: String,
    /// Query parameters; values are encoded by the transport.
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RestRequest {
    #[must_use]
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(Method::Get, resource)
    }

    #[must_use]
    pub fn post(resource: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, resource).with_body(body)
    }

    #[must_use]
    pub fn delete(resource: impl Into<String>) -> Self {
        Self::new(Method::Delete, resource)
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the first query parameter with the given name.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Channel to the remote service.
///
/// Every failure is reported as a [`RemoteFault`] already classified as an
/// authentication or operation fault.
pub trait Transport: Authenticator {
    /// Invoke a named RPC call with the session token and parameters.
    ///
    /// # Errors
    /// Returns a fault if the call fails or the server reports an error.
    fn call(&self, token: &str, operation: &str, params: Vec<Value>) -> Result<Value, RemoteFault>;

    /// Execute a REST request and return its JSON body (`Null` when empty).
    ///
    /// # Errors
    /// Returns a fault if the request fails or the server reports an error.
    fn request(&self, request: RestRequest) -> Result<Value, RemoteFault>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rest_request_builders() {
        let request = RestRequest::post("rest/api/2/component", json!({"name": "Core"}))
            .with_query("moveIssuesTo", "10001");

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.query_value("moveIssuesTo"), Some("10001"));
        assert_eq!(request.query_value("missing"), None);
        assert_eq!(request.body, Some(json!({"name": "Core"})));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
