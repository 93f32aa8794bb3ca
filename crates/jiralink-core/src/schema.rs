//! Declarative schema of the issue fields tracked for partial updates.
//!
//! Each [`FieldSpec`] pairs a logical field name with the identifier the
//! server expects, the rule used to compare current and baseline values, and
//! an accessor reading the value out of [`IssueFields`]. The diff routine in
//! [`crate::diff`] walks this table; nothing else knows about individual fields.

use chrono::{DateTime, FixedOffset};
use std::fmt;

use crate::issue::IssueFields;
use crate::value::ComparableString;

/// Display format the server accepts for date fields (`10/Oct/11`).
///
/// `%b` is always the English month abbreviation, independent of locale.
pub const DATE_FORMAT: &str = "%d/%b/%y";

/// A field value borrowed from [`IssueFields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Named(&'a ComparableString),
    Date(DateTime<FixedOffset>),
}

/// How a field is compared against its baseline and serialized when changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Exact, case-sensitive string equality.
    Text,
    /// Equality of the wrapped value.
    Comparable,
    /// Equality of instants; serialized with [`DATE_FORMAT`] in the value's own offset.
    Date,
}

impl FieldRule {
    /// Whether two present values are equal under this rule.
    ///
    /// Values of a kind the rule does not handle never compare equal.
    #[must_use]
    pub fn equals(self, current: &FieldValue<'_>, baseline: &FieldValue<'_>) -> bool {
        match (self, current, baseline) {
            (Self::Text, FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (Self::Comparable, FieldValue::Named(a), FieldValue::Named(b)) => a.value() == b.value(),
            (Self::Date, FieldValue::Date(a), FieldValue::Date(b)) => a == b,
            _ => false,
        }
    }

    /// Serialize a value into the strings sent to the server.
    #[must_use]
    pub fn serialize(self, value: &FieldValue<'_>) -> Vec<String> {
        let text = match (self, value) {
            (Self::Date, FieldValue::Date(date)) => date.format(DATE_FORMAT).to_string(),
            (_, FieldValue::Text(text)) => (*text).to_string(),
            (_, FieldValue::Named(named)) => named.value().to_string(),
            (_, FieldValue::Date(date)) => date.to_rfc3339(),
        };
        vec![text]
    }
}

/// One entry of the issue field schema.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    /// Logical field name.
    pub name: &'static str,
    /// Identifier of the field on the server.
    pub remote_id: &'static str,
    pub rule: FieldRule,
    pub read: for<'a> fn(&'a IssueFields) -> Option<FieldValue<'a>>,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("remote_id", &self.remote_id)
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}

impl FieldSpec {
    const fn new(
        name: &'static str,
        remote_id: &'static str,
        rule: FieldRule,
        read: for<'a> fn(&'a IssueFields) -> Option<FieldValue<'a>>,
    ) -> Self {
        Self {
            name,
            remote_id,
            rule,
            read,
        }
    }
}

/// Fields tracked on an issue, in the order descriptors are emitted.
pub static ISSUE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("summary", "summary", FieldRule::Text, read_summary),
    FieldSpec::new("description", "description", FieldRule::Text, read_description),
    FieldSpec::new("assignee", "assignee", FieldRule::Text, read_assignee),
    FieldSpec::new("environment", "environment", FieldRule::Text, read_environment),
    FieldSpec::new("project", "project", FieldRule::Text, read_project),
    FieldSpec::new("reporter", "reporter", FieldRule::Text, read_reporter),
    FieldSpec::new("status", "status", FieldRule::Text, read_status),
    FieldSpec::new("type", "type", FieldRule::Text, read_type),
    FieldSpec::new("priority", "priority", FieldRule::Comparable, read_priority),
    FieldSpec::new("resolution", "resolution", FieldRule::Comparable, read_resolution),
    FieldSpec::new("due_date", "duedate", FieldRule::Date, read_due_date),
];

/// Look up a schema entry by logical name.
#[must_use]
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    ISSUE_FIELDS.iter().find(|spec| spec.name == name)
}

fn text(value: Option<&String>) -> Option<FieldValue<'_>> {
    value.map(|v| FieldValue::Text(v.as_str()))
}

fn read_summary(f: &IssueFields) -> Option<FieldValue<'_>> {
    text(f.summary.as_ref())
}

fn read_description(f: &IssueFields) -> Option<FieldValue<'_>> {
    text(f.description.as_ref())
}

fn read_assignee(f: &IssueFields) -> Option<FieldValue<'_>> {
    text(f.assignee.as_ref())
}

fn read_environment(f: &IssueFields) -> Option<FieldValue<'_>> {
    text(f.environment.as_ref())
}

fn read_project(f: &IssueFields) -> Option<FieldValue<'_>> {
    text(f.project.as_ref())
}

fn read_reporter(f: &IssueFields) -> Option<FieldValue<'_>> {
    text(f.reporter.as_ref())
}

fn read_status(f: &IssueFields) -> Option<FieldValue<'_>> {
    text(f.status.as_ref())
}

fn read_type(f: &IssueFields) -> Option<FieldValue<'_>> {
    text(f.issue_type.as_ref())
}

fn read_priority(f: &IssueFields) -> Option<FieldValue<'_>> {
    f.priority.as_ref().map(FieldValue::Named)
}

fn read_resolution(f: &IssueFields) -> Option<FieldValue<'_>> {
    f.resolution.as_ref().map(FieldValue::Named)
}

fn read_due_date(f: &IssueFields) -> Option<FieldValue<'_>> {
    f.due_date.map(FieldValue::Date)
}
