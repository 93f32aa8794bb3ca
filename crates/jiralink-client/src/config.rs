//! Client configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::session::Credentials;

/// Client configuration, usually stored as YAML.
///
/// ```yaml
/// url: https://jira.example.com
/// username: alice
/// password: secret
/// user_privacy: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the server.
    pub url: String,

    /// Username; omit together with the password for anonymous access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Refer to users by account id instead of username.
    #[serde(default)]
    pub user_privacy: bool,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Page size used when fetching issues from a filter.
    #[serde(default = "default_max_issues")]
    pub max_issues_per_request: u32,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_issues() -> u32 {
    20
}

impl ClientConfig {
    /// Create an anonymous configuration for the given server.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            user_privacy: false,
            timeout_secs: default_timeout_secs(),
            max_issues_per_request: default_max_issues(),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub const fn with_user_privacy(mut self, enabled: bool) -> Self {
        self.user_privacy = enabled;
        self
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Returns error if the file is missing, unreadable, or invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClientError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML configuration.
    ///
    /// # Errors
    /// Returns error if the YAML is malformed or the configuration is invalid.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    /// Returns `ClientError::Config` if the URL is empty or only half of the
    /// credentials are set.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ClientError::Config("url must not be empty".to_string()));
        }
        self.credentials().map(|_| ())
    }

    /// Credentials for authenticated access, or `None` for anonymous access.
    ///
    /// # Errors
    /// Returns `ClientError::Config` if only one of username and password is set.
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                Ok(Some(Credentials::new(username.clone(), password.clone())))
            }
            (None, None) => Ok(None),
            _ => Err(ClientError::Config(
                "username and password must be set together".to_string(),
            )),
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_yaml() {
        let config = ClientConfig::from_yaml("url: https://jira.example.com\n").unwrap();

        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_issues_per_request, 20);
        assert!(!config.user_privacy);
        assert!(config.credentials().unwrap().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("jiralink.yml");
        fs::write(
            &path,
            "url: https://jira.example.com\nusername: alice\npassword: secret\nuser_privacy: true\n",
        )
        .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        let credentials = config.credentials().unwrap().unwrap();
        assert_eq!(credentials.username(), "alice");
        assert!(config.user_privacy);
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = ClientConfig::load(tmp.path().join("missing.yml"));
        assert!(matches!(result, Err(ClientError::ConfigNotFound(_))));
    }

    #[test]
    fn test_half_credentials_rejected() {
        let result = ClientConfig::from_yaml("url: https://jira.example.com\nusername: alice\n");
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(matches!(
            ClientConfig::new(" ").validate(),
            Err(ClientError::Config(_))
        ));
    }
}
