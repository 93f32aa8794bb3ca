//! Output formatting for the CLI.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jiralink_core::{FieldChange, Issue, JiraUser, ProjectComponent, RemoteAttachment, DATE_FORMAT};
use serde::Serialize;
use std::fmt::Write;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
}

fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).context("Failed to serialize to YAML")
}

/// Print output in the specified format.
pub fn print<T: Serialize + HumanDisplay>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => println!("{}", value.human_display()),
        OutputFormat::Json => println!("{}", to_json(value)?),
        OutputFormat::Yaml => println!("{}", to_yaml(value)?),
    }
    Ok(())
}

/// Print a list in the specified format.
pub fn print_list<T: Serialize + HumanDisplay>(values: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if values.is_empty() {
                println!("Nothing found.");
            }
            for value in values {
                println!("{}", value.human_display());
            }
        }
        OutputFormat::Json => println!("{}", to_json(values)?),
        OutputFormat::Yaml => println!("{}", to_yaml(values)?),
    }
    Ok(())
}

/// Print issue summaries with dynamic column widths.
pub fn print_issue_list(issues: &[IssueSummary], format: OutputFormat) -> Result<()> {
    let OutputFormat::Human = format else {
        return print_list(issues, format);
    };

    if issues.is_empty() {
        println!("No issues found.");
        return Ok(());
    }

    let key_width = issues.iter().map(|i| i.key.len()).max().unwrap_or(3).max(3);
    let status_width = issues
        .iter()
        .map(|i| i.status.as_deref().map_or(1, str::len))
        .max()
        .unwrap_or(1)
        .max(6);

    println!("{:<key_width$}  {:<status_width$}  SUMMARY", "KEY", "STATUS");
    println!("{}", "-".repeat(key_width + status_width + 20));

    for issue in issues {
        println!(
            "{:<key_width$}  {:<status_width$}  {}",
            issue.key,
            issue.status.as_deref().unwrap_or("-"),
            issue.summary.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Print a success message.
pub fn print_success(message: &str, format: OutputFormat) -> Result<()> {
    let status = serde_json::json!({ "status": "ok", "message": message });
    match format {
        OutputFormat::Human => println!("{message}"),
        OutputFormat::Json => println!("{}", to_json(&status)?),
        OutputFormat::Yaml => println!("{}", to_yaml(&status)?),
    }
    Ok(())
}

/// Trait for human-readable display.
pub trait HumanDisplay {
    fn human_display(&self) -> String;
}

/// Append a `label: value` line when the value is present.
fn field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = writeln!(out, "{:<12}{value}", format!("{label}:"));
    }
}

fn format_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

impl HumanDisplay for Issue {
    fn human_display(&self) -> String {
        let mut out = String::new();
        let fields = &self.fields;

        field(&mut out, "Key", self.key().map(|k| k.value()));
        field(&mut out, "Summary", fields.summary.as_deref());
        field(&mut out, "Project", fields.project.as_deref());
        field(&mut out, "Type", fields.issue_type.as_deref());
        field(&mut out, "Status", fields.status.as_deref());
        field(&mut out, "Priority", fields.priority.as_ref().map(|p| p.value()));
        field(&mut out, "Resolution", fields.resolution.as_ref().map(|r| r.value()));
        field(&mut out, "Assignee", fields.assignee.as_deref());
        field(&mut out, "Reporter", fields.reporter.as_deref());
        field(&mut out, "Environment", fields.environment.as_deref());

        let due = fields.due_date.map(|d| d.format(DATE_FORMAT).to_string());
        field(&mut out, "Due", due.as_deref());
        field(&mut out, "Created", self.created().map(|d| format_time(&d)).as_deref());
        field(&mut out, "Updated", self.updated().map(|d| format_time(&d)).as_deref());

        if !self.custom_fields.is_empty() {
            out.push_str("Custom fields:\n");
            for value in self.custom_fields.iter() {
                let name = value.name.as_deref().unwrap_or(&value.id);
                let _ = writeln!(out, "  {name}: {}", value.values.join(", "));
            }
        }

        if let Some(description) = &fields.description {
            let _ = write!(out, "\n{description}\n");
        }

        out
    }
}

/// Summary view of an issue for list output.
#[derive(Debug, Serialize)]
pub struct IssueSummary {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl From<&Issue> for IssueSummary {
    fn from(issue: &Issue) -> Self {
        Self {
            key: issue.key().map(|k| k.value().to_string()).unwrap_or_default(),
            status: issue.fields.status.clone(),
            summary: issue.fields.summary.clone(),
        }
    }
}

impl HumanDisplay for IssueSummary {
    fn human_display(&self) -> String {
        format!(
            "{:<12} {:10} {}",
            self.key,
            self.status.as_deref().unwrap_or("-"),
            self.summary.as_deref().unwrap_or("")
        )
    }
}

impl HumanDisplay for FieldChange {
    fn human_display(&self) -> String {
        if self.values.is_empty() {
            format!("{} cleared", self.id)
        } else {
            format!("{} = {}", self.id, self.values.join(", "))
        }
    }
}

impl HumanDisplay for RemoteAttachment {
    fn human_display(&self) -> String {
        let size = self
            .filesize
            .map_or_else(|| "-".to_string(), |s| format!("{s} B"));
        format!(
            "{:<30} {:>10}  {}",
            self.filename,
            size,
            self.author.as_deref().unwrap_or("-")
        )
    }
}

impl HumanDisplay for JiraUser {
    fn human_display(&self) -> String {
        let mut out = String::new();
        field(&mut out, "Name", self.display_name.as_deref());
        field(&mut out, "Username", self.username.as_deref());
        field(&mut out, "Account", self.account_id.as_deref());
        field(&mut out, "Email", self.email.as_deref());
        field(&mut out, "Active", Some(if self.is_active { "yes" } else { "no" }));
        out
    }
}

impl HumanDisplay for ProjectComponent {
    fn human_display(&self) -> String {
        match &self.description {
            Some(description) => format!("{:<8} {}  ({description})", self.id, self.name),
            None => format!("{:<8} {}", self.id, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiralink_core::RemoteIssue;

    #[test]
    fn test_issue_human_display() {
        let issue = Issue::from_remote(RemoteIssue {
            key: Some("TST-1".into()),
            summary: Some("Crash on save".to_string()),
            priority: Some("High".into()),
            ..RemoteIssue::default()
        });

        let text = issue.human_display();
        assert!(text.contains("Key:        TST-1"));
        assert!(text.contains("Summary:    Crash on save"));
        assert!(text.contains("Priority:   High"));
        assert!(!text.contains("Assignee"));
    }

    #[test]
    fn test_field_change_display() {
        assert_eq!(
            FieldChange::new("summary", vec!["Crash".to_string()]).human_display(),
            "summary = Crash"
        );
        assert_eq!(FieldChange::new("duedate", Vec::new()).human_display(), "duedate cleared");
    }

    #[test]
    fn test_issue_summary_from_issue() {
        let issue = Issue::from_remote(RemoteIssue {
            key: Some("TST-2".into()),
            status: Some("Open".to_string()),
            ..RemoteIssue::default()
        });

        let summary = IssueSummary::from(&issue);
        assert_eq!(summary.key, "TST-2");
        assert_eq!(summary.status.as_deref(), Some("Open"));
        assert_eq!(summary.summary, None);
    }
}
