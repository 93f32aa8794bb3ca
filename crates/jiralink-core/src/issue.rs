//! Issue model with baseline tracking.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::custom_field::CustomFieldValueCollection;
use crate::diff::{diff, FieldChange};
use crate::error::{CoreError, Result};
use crate::remote::RemoteIssue;
use crate::schema::ISSUE_FIELDS;
use crate::value::ComparableString;

/// Editable fields of an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ComparableString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ComparableString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<FixedOffset>>,
}

impl IssueFields {
    /// Set a field by its schema name; `None` clears it.
    ///
    /// Dates accept `YYYY-MM-DD` (midnight UTC) or RFC 3339; an RFC 3339
    /// offset is kept, so the date sent is the calendar day given.
    ///
    /// # Errors
    /// Returns `CoreError::UnknownField` for names outside the schema and
    /// `CoreError::Validation` for unparseable dates.
    pub fn set(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let text = value.map(str::to_string);
        match name {
            "summary" => self.summary = text,
            "description" => self.description = text,
            "assignee" => self.assignee = text,
            "environment" => self.environment = text,
            "project" => self.project = text,
            "reporter" => self.reporter = text,
            "status" => self.status = text,
            "type" => self.issue_type = text,
            "priority" => self.priority = text.map(ComparableString::from),
            "resolution" => self.resolution = text.map(ComparableString::from),
            "due_date" | "duedate" => self.due_date = value.map(parse_date).transpose()?,
            _ => return Err(CoreError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}

fn parse_date(input: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset());
    }
    DateTime::parse_from_rfc3339(input).map_err(|e| CoreError::Validation(format!("invalid date '{input}': {e}")))
}

/// An issue together with the snapshot it was last synchronized from.
///
/// The baseline is fixed when the issue is constructed or hydrated; only
/// [`Issue::fields`] and [`Issue::custom_fields`] change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Issue {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<ComparableString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated: Option<DateTime<Utc>>,

    /// Current field values.
    #[serde(flatten)]
    pub fields: IssueFields,

    #[serde(skip_serializing_if = "CustomFieldValueCollection::is_empty")]
    pub custom_fields: CustomFieldValueCollection,

    #[serde(skip)]
    baseline: IssueFields,
}

impl Issue {
    /// Create a new, not yet created issue with an empty baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new issue in a project with a type and summary.
    #[must_use]
    pub fn in_project(
        project: impl Into<String>,
        issue_type: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        let mut issue = Self::new();
        issue.fields.project = Some(project.into());
        issue.fields.issue_type = Some(issue_type.into());
        issue.fields.summary = Some(summary.into());
        issue
    }

    /// Hydrate an issue from its remote record; the loaded values become the baseline.
    #[must_use]
    pub fn from_remote(remote: RemoteIssue) -> Self {
        let fields = IssueFields {
            summary: remote.summary,
            description: remote.description,
            assignee: remote.assignee,
            environment: remote.environment,
            project: remote.project,
            reporter: remote.reporter,
            status: remote.status,
            issue_type: remote.issue_type,
            priority: remote.priority,
            resolution: remote.resolution,
            due_date: remote.due_date,
        };

        Self {
            id: remote.id,
            key: remote.key,
            created: remote.created,
            updated: remote.updated,
            custom_fields: CustomFieldValueCollection::from_remote(&remote.custom_field_values),
            baseline: fields.clone(),
            fields,
        }
    }

    /// Convert to a remote record carrying the editable fields.
    ///
    /// Timestamps and the due date are left unset; date changes travel through
    /// [`Issue::updated_fields`].
    #[must_use]
    pub fn to_remote(&self) -> RemoteIssue {
        RemoteIssue {
            id: self.id.clone(),
            key: self.key.clone(),
            summary: self.fields.summary.clone(),
            description: self.fields.description.clone(),
            assignee: self.fields.assignee.clone(),
            environment: self.fields.environment.clone(),
            project: self.fields.project.clone(),
            reporter: self.fields.reporter.clone(),
            status: self.fields.status.clone(),
            issue_type: self.fields.issue_type.clone(),
            priority: self.fields.priority.clone(),
            resolution: self.fields.resolution.clone(),
            created: None,
            updated: None,
            due_date: None,
            custom_field_values: Vec::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> Option<&ComparableString> {
        self.key.as_ref()
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    #[must_use]
    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    /// The values the issue was last synchronized from.
    #[must_use]
    pub fn baseline(&self) -> &IssueFields {
        &self.baseline
    }

    /// Whether the issue exists on the server.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.key.is_some()
    }

    /// The issue key, or a precondition error naming the attempted operation.
    ///
    /// # Errors
    /// Returns `CoreError::Precondition` if the issue has not been created.
    pub fn require_key(&self, operation: &str) -> Result<&str> {
        self.key.as_ref().map(ComparableString::value).ok_or_else(|| {
            CoreError::Precondition(format!(
                "unable to {operation}: issue has not been created"
            ))
        })
    }

    /// Fields that changed since the baseline, followed by changed custom fields.
    #[must_use]
    pub fn updated_fields(&self) -> Vec<FieldChange> {
        let mut changes = diff(ISSUE_FIELDS, &self.fields, &self.baseline);
        changes.extend(self.custom_fields.remote_fields());
        changes
    }

    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<ComparableString>) -> Self {
        self.fields.priority = Some(priority.into());
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.fields.assignee = Some(assignee.into());
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<DateTime<FixedOffset>>) -> Self {
        self.fields.due_date = Some(due_date.into());
        self
    }
}
