//! Blocking HTTP transport.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::fault::RemoteFault;
use crate::session::{Authenticator, Credentials};
use crate::transport::{Method, RestRequest, Transport};

/// Path of the JSON-RPC endpoint, relative to the server URL.
const RPC_PATH: &str = "rpc/json-rpc/jirasoapservice-v2";

/// [`Transport`] over HTTP using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Build a transport for the configured server.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            credentials: config.credentials()?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource.trim_start_matches('/'))
    }

    fn rpc(&self, operation: &str, params: Vec<Value>) -> std::result::Result<Value, RemoteFault> {
        debug!(operation, "RPC call");

        let builder = self
            .client
            .post(self.url(&format!("{RPC_PATH}/{operation}")))
            .json(&Value::Array(params));
        parse_rpc_body(send(builder)?)
    }
}

/// Unwrap a JSON-RPC reply.
///
/// A non-null `error` member is a fault; a `result` member is the value.
/// Bare values are returned as they are.
fn parse_rpc_body(body: Value) -> std::result::Result<Value, RemoteFault> {
    if let Some(error) = body.get("error").filter(|error| !error.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string);
        return Err(RemoteFault::classified(None, message));
    }

    match body {
        Value::Object(mut fields) if fields.contains_key("result") => {
            Ok(fields.remove("result").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

impl Authenticator for HttpTransport {
    fn login(&self, username: &str, password: &str) -> std::result::Result<String, RemoteFault> {
        let result = self.rpc("login", vec![Value::from(username), Value::from(password)])?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RemoteFault::operation(format!("unexpected login response: {result}")))
    }
}

impl Transport for HttpTransport {
    fn call(
        &self,
        token: &str,
        operation: &str,
        params: Vec<Value>,
    ) -> std::result::Result<Value, RemoteFault> {
        let mut args = Vec::with_capacity(params.len() + 1);
        args.push(Value::from(token));
        args.extend(params);
        self.rpc(operation, args)
    }

    fn request(&self, request: RestRequest) -> std::result::Result<Value, RemoteFault> {
        debug!(method = %request.method, resource = %request.resource, "REST request");

        let url = self.url(&request.resource);
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(credentials.username(), Some(credentials.password()));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        send(builder)
    }
}

fn send(builder: RequestBuilder) -> std::result::Result<Value, RemoteFault> {
    let response = builder
        .send()
        .map_err(|e| RemoteFault::operation(format!("request failed: {e}")))?;
    read_body(response)
}

fn read_body(response: Response) -> std::result::Result<Value, RemoteFault> {
    let status = response.status();
    let text = response
        .text()
        .map_err(|e| RemoteFault::operation(format!("failed to read response: {e}")))?;

    if !status.is_success() {
        return Err(RemoteFault::classified(
            Some(status.as_u16()),
            error_message(status, &text),
        ));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text)
        .map_err(|e| RemoteFault::operation(format!("invalid JSON response: {e}")))
}

/// Best-effort message from an error response body.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let from_json = parsed.as_ref().and_then(|value| {
        value
            .get("errorMessages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.first())
            .or_else(|| value.get("error").and_then(|e| e.get("message")))
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    from_json.unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_urls_are_joined_without_double_slashes() {
        let config = ClientConfig::new("https://jira.example.com/");
        let transport = HttpTransport::new(&config).unwrap();

        assert_eq!(transport.base_url(), "https://jira.example.com");
        assert_eq!(
            transport.url("/rest/api/2/component"),
            "https://jira.example.com/rest/api/2/component"
        );
        assert_eq!(
            transport.url(&format!("{RPC_PATH}/getIssue")),
            "https://jira.example.com/rpc/json-rpc/jirasoapservice-v2/getIssue"
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ClientConfig {
            username: Some("alice".to_string()),
            ..ClientConfig::new("https://jira.example.com")
        };
        assert!(matches!(HttpTransport::new(&config), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_rpc_success_envelope_with_null_error() {
        let body = json!({"result": "token", "error": null, "id": 1});
        assert_eq!(parse_rpc_body(body).unwrap(), json!("token"));
    }

    #[test]
    fn test_rpc_error_envelope_is_classified() {
        let body = json!({
            "result": null,
            "error": {"message": "com.atlassian.jira.rpc.exception.RemoteAuthenticationException: Invalid username or password."}
        });
        let fault = parse_rpc_body(body).unwrap_err();
        assert!(fault.is_auth());

        let fault = parse_rpc_body(json!({"error": {"code": 500}})).unwrap_err();
        assert!(!fault.is_auth());
        assert_eq!(fault.message, r#"{"code":500}"#);
    }

    #[test]
    fn test_rpc_bare_values_pass_through() {
        assert_eq!(parse_rpc_body(json!("token")).unwrap(), json!("token"));
        assert_eq!(
            parse_rpc_body(json!({"key": "TST-1"})).unwrap(),
            json!({"key": "TST-1"})
        );
        assert_eq!(parse_rpc_body(json!({"result": null})).unwrap(), Value::Null);
    }

    #[test]
    fn test_error_message_prefers_json_messages() {
        let body = r#"{"errorMessages":["Issue Does Not Exist"],"errors":{}}"#;
        assert_eq!(error_message(StatusCode::NOT_FOUND, body), "Issue Does Not Exist");

        let body = r#"{"error":{"message":"com.atlassian.jira.rpc.exception.RemoteAuthenticationException"}}"#;
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, body),
            "com.atlassian.jira.rpc.exception.RemoteAuthenticationException"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, ""), "401 Unauthorized");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "gateway down"), "gateway down");
    }
}
