//! Change tracking between an issue and its last synchronized baseline.

use serde::{Deserialize, Serialize};

use crate::issue::IssueFields;
use crate::schema::FieldSpec;

/// One field to send in a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Remote field identifier.
    pub id: String,
    /// Serialized new values; empty when the field was cleared.
    pub values: Vec<String>,
}

impl FieldChange {
    #[must_use]
    pub fn new(id: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }
}

/// Compute the descriptors for every schema field whose current value differs
/// from the baseline.
///
/// Fields absent on both sides, or present on both sides and equal under the
/// field's rule, are skipped. Descriptors come out in schema order.
#[must_use]
pub fn diff(schema: &[FieldSpec], current: &IssueFields, baseline: &IssueFields) -> Vec<FieldChange> {
    schema
        .iter()
        .filter_map(|spec| {
            let now = (spec.read)(current);
            let then = (spec.read)(baseline);

            match (now, then) {
                (None, None) => None,
                (Some(now), Some(then)) if spec.rule.equals(&now, &then) => None,
                (now, _) => Some(FieldChange::new(
                    spec.remote_id,
                    now.map(|value| spec.rule.serialize(&value)).unwrap_or_default(),
                )),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ISSUE_FIELDS;
    use crate::value::ComparableString;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn loaded() -> IssueFields {
        IssueFields {
            summary: Some("Summary".to_string()),
            priority: Some(ComparableString::from("High")),
            due_date: Some(Utc.with_ymd_and_hms(2011, 1, 1, 0, 0, 0).unwrap().fixed_offset()),
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_fields_produce_no_changes() {
        assert!(diff(ISSUE_FIELDS, &loaded(), &loaded()).is_empty());
        assert!(diff(ISSUE_FIELDS, &IssueFields::default(), &IssueFields::default()).is_empty());
    }

    #[test]
    fn test_only_date_changed() {
        let mut current = loaded();
        current.due_date = Some(Utc.with_ymd_and_hms(2011, 10, 10, 0, 0, 0).unwrap().fixed_offset());

        assert_eq!(
            diff(ISSUE_FIELDS, &current, &loaded()),
            vec![FieldChange::new("duedate", vec!["10/Oct/11".to_string()])]
        );
    }

    #[test]
    fn test_equal_string_is_skipped_when_others_change() {
        let mut current = loaded();
        current.summary = Some("Summary".to_string());
        current.assignee = Some("alice".to_string());

        let changes = diff(ISSUE_FIELDS, &current, &loaded());
        assert_eq!(changes, vec![FieldChange::new("assignee", vec!["alice".to_string()])]);
    }

    #[test]
    fn test_empty_string_differs_from_absent() {
        let current = IssueFields {
            environment: Some(String::new()),
            ..Default::default()
        };

        let changes = diff(ISSUE_FIELDS, &current, &IssueFields::default());
        assert_eq!(changes, vec![FieldChange::new("environment", vec![String::new()])]);
    }

    #[test]
    fn test_priority_scenario() {
        let mut current = loaded();
        current.priority = Some(ComparableString::from("High"));
        assert!(diff(ISSUE_FIELDS, &current, &loaded()).is_empty());

        current.priority = Some(ComparableString::from("Low"));
        assert_eq!(
            diff(ISSUE_FIELDS, &current, &loaded()),
            vec![FieldChange::new("priority", vec!["Low".to_string()])]
        );
    }

    #[test]
    fn test_cleared_field_emits_empty_values() {
        let mut current = loaded();
        current.summary = None;

        assert_eq!(
            diff(ISSUE_FIELDS, &current, &loaded()),
            vec![FieldChange::new("summary", Vec::new())]
        );
    }

    #[test]
    fn test_changes_follow_schema_order() {
        let current = IssueFields {
            due_date: Some(Utc.with_ymd_and_hms(2012, 2, 29, 0, 0, 0).unwrap().fixed_offset()),
            resolution: Some(ComparableString::from("Fixed")),
            summary: Some("foo".to_string()),
            issue_type: Some("1".to_string()),
            ..Default::default()
        };

        let ids: Vec<String> = diff(ISSUE_FIELDS, &current, &IssueFields::default())
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["summary", "type", "resolution", "duedate"]);
    }
}
