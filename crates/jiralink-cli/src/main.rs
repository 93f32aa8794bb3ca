//! jiralink CLI - Issue tracker access from the command line.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "jiralink")]
#[command(author, version, about = "Issue tracker client")]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    format: output::OutputFormat,

    /// Configuration file (YAML)
    #[arg(long, short = 'c', global = true, env = "JIRALINK_CONFIG")]
    config: Option<PathBuf>,

    /// Server URL (overrides the configuration file)
    #[arg(long, global = true, env = "JIRALINK_URL")]
    url: Option<String>,

    /// Username (overrides the configuration file)
    #[arg(long, global = true, env = "JIRALINK_USER")]
    user: Option<String>,

    /// Password (overrides the configuration file)
    #[arg(long, global = true, env = "JIRALINK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with issues
    #[command(subcommand)]
    Issue(IssueCommands),

    /// Work with users
    #[command(subcommand)]
    User(UserCommands),

    /// Work with project components
    #[command(subcommand)]
    Component(ComponentCommands),
}

#[derive(Subcommand)]
enum IssueCommands {
    /// Show an issue
    Show {
        /// Issue key (e.g., TST-1)
        key: String,
    },

    /// List the attachments of an issue
    Attachments {
        /// Issue key
        key: String,
    },

    /// List issues matched by a favourite filter
    Filter {
        /// Filter name
        name: String,

        /// Index of the first issue
        #[arg(long)]
        start: Option<u32>,

        /// Maximum number of issues
        #[arg(long)]
        max: Option<u32>,
    },

    /// Set fields on an issue and send the changes
    Set {
        /// Issue key
        key: String,

        /// Field assignments (field=value, empty value clears)
        #[arg(required = true)]
        assignments: Vec<String>,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Show a user by username or account id
    Get {
        /// Username, or account id in user privacy mode
        id: String,
    },

    /// Search active users
    Search {
        /// Search text
        query: String,
    },

    /// Show the authenticated user
    Me,
}

#[derive(Subcommand)]
enum ComponentCommands {
    /// List the components of a project
    #[command(alias = "ls")]
    List {
        /// Project key
        project: String,
    },

    /// Add a component to a project
    Add {
        /// Project key
        project: String,

        /// Component name
        name: String,

        /// Description
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// Delete a component from a project
    Delete {
        /// Project key
        project: String,

        /// Component name (case-insensitive)
        name: String,

        /// Component id to move affected issues to
        #[arg(long)]
        move_issues_to: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env();
    if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    let settings = commands::ConnectionArgs {
        config: cli.config,
        url: cli.url,
        user: cli.user,
        password: cli.password,
    };
    let format = cli.format;

    match cli.command {
        Commands::Issue(command) => {
            let (client, config) = commands::connect(&settings)?;
            match command {
                IssueCommands::Show { key } => commands::issue_show(&client, &key, format),
                IssueCommands::Attachments { key } => {
                    commands::issue_attachments(&client, &key, format)
                }
                IssueCommands::Filter { name, start, max } => {
                    commands::issue_filter(&client, &config, &name, start, max, format)
                }
                IssueCommands::Set { key, assignments } => {
                    commands::issue_set(&client, &key, &assignments, format)
                }
            }
        }
        Commands::User(command) => {
            let (client, _) = commands::connect(&settings)?;
            match command {
                UserCommands::Get { id } => commands::user_get(&client, &id, format),
                UserCommands::Search { query } => commands::user_search(&client, &query, format),
                UserCommands::Me => commands::user_me(&client, format),
            }
        }
        Commands::Component(command) => {
            let (client, _) = commands::connect(&settings)?;
            match command {
                ComponentCommands::List { project } => {
                    commands::component_list(&client, &project, format)
                }
                ComponentCommands::Add {
                    project,
                    name,
                    description,
                } => commands::component_add(&client, &project, &name, description, format),
                ComponentCommands::Delete {
                    project,
                    name,
                    move_issues_to,
                } => commands::component_delete(
                    &client,
                    &project,
                    &name,
                    move_issues_to.as_deref(),
                    format,
                ),
            }
        }
    }
}
