//! Error types for the client.

use std::path::PathBuf;
use thiserror::Error;

use crate::fault::RemoteFault;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur in client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected an operation.
    #[error("remote fault: {0}")]
    Fault(#[from] RemoteFault),

    /// Authentication still failed after logging in again.
    #[error("authentication failed: {0}")]
    FatalAuth(RemoteFault),

    /// No favourite filter with the given name.
    #[error("filter not found: {0}")]
    FilterNotFound(String),

    /// No component with the given name in the project.
    #[error("component '{name}' not found in project {project}")]
    ComponentNotFound { project: String, name: String },

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("config file not found at '{0}'")]
    ConfigNotFound(PathBuf),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core library error, including precondition failures.
    #[error(transparent)]
    Core(#[from] jiralink_core::CoreError),
}

impl ClientError {
    /// Whether the error is a remote authentication fault eligible for re-login.
    #[must_use]
    pub fn is_auth_fault(&self) -> bool {
        matches!(self, Self::Fault(fault) if fault.is_auth())
    }

    /// Whether the error reports an issue-scoped call on an issue not yet created.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Core(jiralink_core::CoreError::Precondition(_)))
    }
}
