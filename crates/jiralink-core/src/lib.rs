//! jiralink-core: Issue models and change tracking for the jiralink client.
//!
//! This crate provides:
//! - `Issue`: an issue with its last synchronized baseline
//! - `ISSUE_FIELDS` and `diff`: the declarative field schema and the routine
//!   computing the fields to send in a partial update
//! - Custom field values, users, project components and OAuth settings
//! - `remote`: records exchanged with the server

pub mod component;
pub mod custom_field;
pub mod diff;
pub mod error;
pub mod issue;
pub mod oauth;
pub mod remote;
pub mod schema;
pub mod user;
pub mod value;

pub use component::{ProjectComponent, ProjectComponentCreationInfo};
pub use custom_field::{CustomFieldValue, CustomFieldValueCollection, FieldContext, FieldResolver};
pub use diff::{diff, FieldChange};
pub use error::{CoreError, Result};
pub use issue::{Issue, IssueFields};
pub use oauth::{
    OAuthAccessTokenSettings, OAuthRequestToken, OAuthRequestTokenSettings, SignatureMethod,
};
pub use remote::{
    RemoteAttachment, RemoteComponent, RemoteCustomFieldValue, RemoteField, RemoteFilter,
    RemoteIssue,
};
pub use schema::{field_spec, FieldRule, FieldSpec, FieldValue, DATE_FORMAT, ISSUE_FIELDS};
pub use user::{JiraUser, JiraUserCreationInfo, JiraUserStatus, RemoteJiraUser, UserCodec};
pub use value::ComparableString;
