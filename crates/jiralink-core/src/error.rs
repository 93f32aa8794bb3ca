//! Error types for jiralink-core.

use thiserror::Error;

/// Result type alias for jiralink-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in jiralink-core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An issue-scoped operation was attempted before the issue exists remotely.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A custom field name is not editable on the issue.
    #[error(
        "could not find custom field with name '{0}' on the server; make sure the field is available when editing the issue"
    )]
    UnknownCustomField(String),

    /// A custom field name is not available for a workflow action.
    #[error("could not find custom field with name '{name}' and action with id '{action_id}' on the server")]
    UnknownActionField { name: String, action_id: String },

    /// A tracked field name is not part of the issue schema.
    #[error("unknown issue field: {0}")]
    UnknownField(String),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}
