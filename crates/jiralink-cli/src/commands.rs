//! CLI command implementations.

use crate::output::{self, IssueSummary, OutputFormat};
use anyhow::{bail, Context, Result};
use jiralink_client::{ClientConfig, JiraClient};
use jiralink_core::{Issue, ProjectComponentCreationInfo};
use std::path::PathBuf;

/// Where to find the server and credentials.
#[derive(Debug, Default)]
pub struct ConnectionArgs {
    pub config: Option<PathBuf>,
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Build the client configuration: the file first, then command line overrides.
pub fn resolve_config(args: &ConnectionArgs) -> Result<ClientConfig> {
    let mut config = match (&args.config, &args.url) {
        (Some(path), _) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        (None, Some(url)) => ClientConfig::new(url.clone()),
        (None, None) => bail!("No server configured: pass --config or --url"),
    };

    if let Some(url) = &args.url {
        config.url.clone_from(url);
    }
    if let Some(user) = &args.user {
        config.username = Some(user.clone());
    }
    if let Some(password) = &args.password {
        config.password = Some(password.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Connect to the configured server.
pub fn connect(args: &ConnectionArgs) -> Result<(JiraClient, ClientConfig)> {
    let config = resolve_config(args)?;
    let client = JiraClient::connect(&config).context("Failed to create client")?;
    Ok((client, config))
}

/// Split a `field=value` assignment; an empty value clears the field.
pub fn parse_assignment(assignment: &str) -> Result<(&str, Option<&str>)> {
    let Some((field, value)) = assignment.split_once('=') else {
        bail!("Invalid assignment '{assignment}': expected field=value");
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("Invalid assignment '{assignment}': missing field name");
    }
    Ok((field, Some(value).filter(|v| !v.is_empty())))
}

/// Apply assignments to an issue's fields.
pub fn apply_assignments(issue: &mut Issue, assignments: &[String]) -> Result<()> {
    for assignment in assignments {
        let (field, value) = parse_assignment(assignment)?;
        issue
            .fields
            .set(field, value)
            .with_context(|| format!("Failed to set {field}"))?;
    }
    Ok(())
}

/// Show an issue.
pub fn issue_show(client: &JiraClient, key: &str, format: OutputFormat) -> Result<()> {
    let issue = client
        .get_issue(key)
        .with_context(|| format!("Failed to get issue {key}"))?;
    output::print(&issue, format)
}

/// List attachments of an issue.
pub fn issue_attachments(client: &JiraClient, key: &str, format: OutputFormat) -> Result<()> {
    let issue = client
        .get_issue(key)
        .with_context(|| format!("Failed to get issue {key}"))?;
    let attachments = client
        .attachments(&issue)
        .context("Failed to list attachments")?;
    output::print_list(&attachments, format)
}

/// List issues from a favourite filter.
pub fn issue_filter(
    client: &JiraClient,
    config: &ClientConfig,
    name: &str,
    start: Option<u32>,
    max: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let issues = client
        .issues_from_filter(
            name,
            start.unwrap_or(0),
            max.unwrap_or(config.max_issues_per_request),
        )
        .with_context(|| format!("Failed to run filter '{name}'"))?;

    let summaries: Vec<IssueSummary> = issues.iter().map(IssueSummary::from).collect();
    output::print_issue_list(&summaries, format)
}

/// Set fields on an issue, print the changes and send them.
pub fn issue_set(
    client: &JiraClient,
    key: &str,
    assignments: &[String],
    format: OutputFormat,
) -> Result<()> {
    let mut issue = client
        .get_issue(key)
        .with_context(|| format!("Failed to get issue {key}"))?;
    apply_assignments(&mut issue, assignments)?;

    let changes = issue.updated_fields();
    if changes.is_empty() {
        return output::print_success(&format!("{key} is unchanged"), format);
    }

    output::print_list(&changes, format)?;
    client
        .update_issue(&issue)
        .with_context(|| format!("Failed to update issue {key}"))?;
    output::print_success(&format!("Updated {key}"), format)
}

/// Show a user.
pub fn user_get(client: &JiraClient, id: &str, format: OutputFormat) -> Result<()> {
    let user = client
        .users()
        .get_user(id)
        .with_context(|| format!("Failed to get user {id}"))?;
    output::print(&user, format)
}

/// Search active users.
pub fn user_search(client: &JiraClient, query: &str, format: OutputFormat) -> Result<()> {
    let users = client
        .users()
        .search_users_default(query)
        .context("Failed to search users")?;
    output::print_list(&users, format)
}

/// Show the authenticated user.
pub fn user_me(client: &JiraClient, format: OutputFormat) -> Result<()> {
    let user = client
        .users()
        .myself()
        .context("Failed to get current user")?;
    output::print(&user, format)
}

/// List the components of a project.
pub fn component_list(client: &JiraClient, project: &str, format: OutputFormat) -> Result<()> {
    let components = client
        .components(project)
        .get()
        .with_context(|| format!("Failed to list components of {project}"))?;
    output::print_list(&components, format)
}

/// Add a component to a project.
pub fn component_add(
    client: &JiraClient,
    project: &str,
    name: &str,
    description: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let mut info = ProjectComponentCreationInfo::new(name);
    info.description = description;

    let component = client
        .components(project)
        .add(&info)
        .with_context(|| format!("Failed to add component to {project}"))?;
    output::print(&component, format)
}

/// Delete a component from a project.
pub fn component_delete(
    client: &JiraClient,
    project: &str,
    name: &str,
    move_issues_to: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    client
        .components(project)
        .delete(name, move_issues_to)
        .with_context(|| format!("Failed to delete component {name}"))?;
    output::print_success(&format!("Deleted component {name} from {project}"), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("summary=Crash").unwrap(), ("summary", Some("Crash")));
        assert_eq!(parse_assignment("priority=").unwrap(), ("priority", None));
        assert_eq!(
            parse_assignment("description=a=b").unwrap(),
            ("description", Some("a=b"))
        );
        assert!(parse_assignment("summary").is_err());
        assert!(parse_assignment("=value").is_err());
    }

    #[test]
    fn test_apply_assignments_tracks_changes() {
        let mut issue = Issue::new();
        apply_assignments(
            &mut issue,
            &["summary=Crash".to_string(), "due_date=2011-10-10".to_string()],
        )
        .unwrap();

        let changes = issue.updated_fields();
        let ids: Vec<&str> = changes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["summary", "duedate"]);
        assert_eq!(changes[1].values, vec!["10/Oct/11"]);
    }

    #[test]
    fn test_apply_assignments_rejects_unknown_field() {
        let mut issue = Issue::new();
        assert!(apply_assignments(&mut issue, &["colour=red".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_config_overrides_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("jiralink.yml");
        std::fs::write(&path, "url: https://old.example.com\nusername: alice\npassword: a\n").unwrap();

        let config = resolve_config(&ConnectionArgs {
            config: Some(path),
            url: Some("https://jira.example.com".to_string()),
            user: Some("bob".to_string()),
            password: Some("b".to_string()),
        })
        .unwrap();

        assert_eq!(config.url, "https://jira.example.com");
        assert_eq!(config.username.as_deref(), Some("bob"));
        assert_eq!(config.password.as_deref(), Some("b"));
    }

    #[test]
    fn test_resolve_config_requires_server() {
        assert!(resolve_config(&ConnectionArgs::default()).is_err());
    }

    #[test]
    fn test_resolve_config_rejects_half_credentials() {
        let result = resolve_config(&ConnectionArgs {
            url: Some("https://jira.example.com".to_string()),
            user: Some("bob".to_string()),
            ..ConnectionArgs::default()
        });
        assert!(result.is_err());
    }
}
