//! Settings for obtaining OAuth request and access tokens.
//!
//! These are plain values; signing and exchanging tokens happens elsewhere.

use serde::{Deserialize, Serialize};

/// Default path of the request token endpoint, relative to the server URL.
pub const DEFAULT_REQUEST_TOKEN_PATH: &str = "plugins/servlet/oauth/request-token";
/// Default path of the access token endpoint, relative to the server URL.
pub const DEFAULT_ACCESS_TOKEN_PATH: &str = "plugins/servlet/oauth/access-token";
/// Default callback for out-of-band authorization.
pub const DEFAULT_CALLBACK: &str = "oob";

/// Signature method used to sign OAuth requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureMethod {
    #[default]
    #[serde(rename = "RSA-SHA1")]
    RsaSha1,
    #[serde(rename = "HMAC-SHA1")]
    HmacSha1,
    #[serde(rename = "PLAINTEXT")]
    PlainText,
}

impl std::fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RsaSha1 => write!(f, "RSA-SHA1"),
            Self::HmacSha1 => write!(f, "HMAC-SHA1"),
            Self::PlainText => write!(f, "PLAINTEXT"),
        }
    }
}

/// Settings for requesting an OAuth request token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthRequestTokenSettings {
    pub url: String,
    pub consumer_key: String,
    /// Consumer private key (PEM or XML, as issued by the application link).
    pub consumer_secret: String,
    #[serde(default = "default_callback")]
    pub callback_url: String,
    #[serde(default)]
    pub signature_method: SignatureMethod,
    #[serde(default = "default_request_token_path")]
    pub request_token_url: String,
}

fn default_callback() -> String {
    DEFAULT_CALLBACK.to_string()
}

fn default_request_token_path() -> String {
    DEFAULT_REQUEST_TOKEN_PATH.to_string()
}

fn default_access_token_path() -> String {
    DEFAULT_ACCESS_TOKEN_PATH.to_string()
}

impl OAuthRequestTokenSettings {
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            callback_url: default_callback(),
            signature_method: SignatureMethod::default(),
            request_token_url: default_request_token_path(),
        }
    }

    /// Absolute URL of the request token endpoint.
    #[must_use]
    pub fn request_token_endpoint(&self) -> String {
        join_url(&self.url, &self.request_token_url)
    }
}

/// Request token issued by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthRequestToken {
    pub authorize_uri: String,
    pub oauth_token: String,
    pub oauth_token_secret: String,
    #[serde(default)]
    pub oauth_callback_confirmed: bool,
}

/// Settings for exchanging an authorized request token for an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthAccessTokenSettings {
    pub url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub oauth_request_token: String,
    pub oauth_token_secret: String,
    #[serde(default)]
    pub signature_method: SignatureMethod,
    #[serde(default = "default_access_token_path")]
    pub access_token_url: String,
}

impl OAuthAccessTokenSettings {
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        oauth_request_token: impl Into<String>,
        oauth_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            oauth_request_token: oauth_request_token.into(),
            oauth_token_secret: oauth_token_secret.into(),
            signature_method: SignatureMethod::default(),
            access_token_url: default_access_token_path(),
        }
    }

    /// Build access token settings from the settings and token of the request step.
    #[must_use]
    pub fn from_request_token(
        settings: &OAuthRequestTokenSettings,
        token: &OAuthRequestToken,
    ) -> Self {
        Self {
            url: settings.url.clone(),
            consumer_key: settings.consumer_key.clone(),
            consumer_secret: settings.consumer_secret.clone(),
            oauth_request_token: token.oauth_token.clone(),
            oauth_token_secret: token.oauth_token_secret.clone(),
            signature_method: settings.signature_method,
            access_token_url: default_access_token_path(),
        }
    }

    #[must_use]
    pub fn with_signature_method(mut self, method: SignatureMethod) -> Self {
        self.signature_method = method;
        self
    }

    #[must_use]
    pub fn with_access_token_url(mut self, path: impl Into<String>) -> Self {
        self.access_token_url = path.into();
        self
    }

    /// Absolute URL of the access token endpoint.
    #[must_use]
    pub fn access_token_endpoint(&self) -> String {
        join_url(&self.url, &self.access_token_url)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
