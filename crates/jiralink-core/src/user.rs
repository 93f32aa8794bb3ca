//! User model and its conversion to and from the REST representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// A user account on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Identifier used when referring to this user in requests: the account id
    /// in user privacy mode, the username otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_identifier: Option<String>,
}

/// User record as returned by the REST endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteJiraUser {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_urls: Map<String, Value>,
}

/// Preferred avatar size when several are offered.
const PREFERRED_AVATAR: &str = "48x48";

/// Converts users between [`JiraUser`] and the REST representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCodec {
    /// Refer to users by account id instead of username.
    pub privacy_mode: bool,
}

impl UserCodec {
    #[must_use]
    pub const fn new(privacy_mode: bool) -> Self {
        Self { privacy_mode }
    }

    /// Decode a remote user record.
    #[must_use]
    pub fn decode(&self, remote: RemoteJiraUser) -> JiraUser {
        let avatar_url = remote
            .avatar_urls
            .get(PREFERRED_AVATAR)
            .or_else(|| remote.avatar_urls.values().next())
            .and_then(Value::as_str)
            .map(str::to_string);

        let internal_identifier = if self.privacy_mode {
            remote.account_id.clone()
        } else {
            remote.name.clone()
        };

        JiraUser {
            account_id: remote.account_id,
            username: remote.name,
            display_name: remote.display_name,
            email: remote.email_address,
            is_active: remote.active,
            key: remote.key,
            locale: remote.locale,
            self_url: remote.self_url,
            avatar_url,
            internal_identifier,
        }
    }

    /// Decode a user from a JSON value.
    ///
    /// # Errors
    /// Returns `CoreError::Json` if the value is not a user record.
    pub fn decode_value(&self, value: Value) -> Result<JiraUser> {
        Ok(self.decode(serde_json::from_value(value)?))
    }

    /// Encode a user as a single-identifier reference object.
    #[must_use]
    pub fn encode(&self, user: &JiraUser) -> Value {
        let mut reference = Map::new();
        reference.insert(
            self.reference_field().to_string(),
            user.internal_identifier.clone().map_or(Value::Null, Value::String),
        );
        Value::Object(reference)
    }

    /// Field naming a user inside request bodies.
    #[must_use]
    pub const fn reference_field(&self) -> &'static str {
        if self.privacy_mode { "accountId" } else { "name" }
    }

    /// Query parameter identifying a single user.
    #[must_use]
    pub const fn identifier_param(&self) -> &'static str {
        if self.privacy_mode { "accountId" } else { "username" }
    }

    /// Query parameter carrying a user search string.
    #[must_use]
    pub const fn search_param(&self) -> &'static str {
        if self.privacy_mode { "query" } else { "username" }
    }
}

/// Information needed to create a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUserCreationInfo {
    #[serde(rename = "name")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "emailAddress")]
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub notification: bool,
}

/// Which accounts a user search includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JiraUserStatus {
    #[default]
    Active,
    Inactive,
    Any,
}

impl JiraUserStatus {
    #[must_use]
    pub const fn includes_active(self) -> bool {
        matches!(self, Self::Active | Self::Any)
    }

    #[must_use]
    pub const fn includes_inactive(self) -> bool {
        matches!(self, Self::Inactive | Self::Any)
    }
}
