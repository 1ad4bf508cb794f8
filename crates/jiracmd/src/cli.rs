//! Command-line interface definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bulk operations against a JIRA server
///
/// Connects to the server named in the configuration file (jira.toml in the
/// current directory by default) and runs one command per invocation.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Any failure
#[derive(Parser, Debug)]
#[command(name = "jiracmd", version)]
#[command(about = "Bulk operations against a JIRA server", long_about = None)]
pub struct Cli {
    /// Configuration file (overrides JIRACMD_CONFIG)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log every remote call to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move every issue matched by a filter or query to a target state
    ///
    /// The transition is resolved against the first issue and applied to all
    /// of them in order. The run stops at the first failure; issues already
    /// transitioned stay transitioned.
    Bulk {
        /// Project whose metadata the session loads
        project: String,

        /// Saved filter id (digits only) or JQL query
        spec: String,

        /// Name of the transition to apply (case-insensitive)
        state: String,

        /// Output JSON format
        #[arg(long)]
        json: bool,
    },

    /// List issues matched by a filter or query
    Find {
        /// Project whose metadata the session loads
        project: String,

        /// Saved filter id (digits only) or JQL query
        spec: String,

        #[arg(long)]
        json: bool,
    },

    /// Show a single issue
    Show {
        /// Issue key (e.g. PROJ-123)
        key: String,

        #[arg(long)]
        json: bool,
    },

    /// List projects visible to the configured user
    Projects {
        #[arg(long)]
        json: bool,
    },

    /// Create an issue
    Create {
        /// Issue type name (case-insensitive)
        #[arg(long = "type", value_name = "TYPE")]
        issue_type: String,

        /// Component name (case-insensitive)
        #[arg(long)]
        component: String,

        #[arg(long)]
        summary: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Project key (defaults to the configured project)
        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Link two issues unless the source already links to the target
    Link {
        /// Issue the link starts from
        source: String,

        /// Issue the link points at
        target: String,

        /// Link type name (case-insensitive)
        #[arg(long)]
        link_type: String,

        /// Project key (defaults to the configured project)
        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Upload a file as an attachment
    Attach {
        /// Issue key (e.g. PROJ-123)
        key: String,

        /// File to upload
        file: PathBuf,

        /// Project key (defaults to the configured project)
        #[arg(long)]
        project: Option<String>,
    },
}

impl Commands {
    /// Name used in JSON metadata
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Bulk { .. } => "bulk",
            Commands::Find { .. } => "find",
            Commands::Show { .. } => "show",
            Commands::Projects { .. } => "projects",
            Commands::Create { .. } => "create",
            Commands::Link { .. } => "link",
            Commands::Attach { .. } => "attach",
        }
    }

    pub fn wants_json(&self) -> bool {
        match self {
            Commands::Bulk { json, .. }
            | Commands::Find { json, .. }
            | Commands::Show { json, .. }
            | Commands::Projects { json }
            | Commands::Create { json, .. }
            | Commands::Link { json, .. } => *json,
            Commands::Attach { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bulk() {
        let cli = Cli::try_parse_from(["jiracmd", "bulk", "TEST", "11300", "Done"]).unwrap();
        match cli.command {
            Commands::Bulk {
                project,
                spec,
                state,
                json,
            } => {
                assert_eq!(project, "TEST");
                assert_eq!(spec, "11300");
                assert_eq!(state, "Done");
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "jiracmd",
            "find",
            "TEST",
            "project = TEST",
            "--config",
            "other.toml",
            "-q",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
        assert!(cli.quiet);
        assert_eq!(cli.command.name(), "find");
    }

    #[test]
    fn test_create_requires_type_component_and_summary() {
        assert!(Cli::try_parse_from(["jiracmd", "create", "--type", "Bug"]).is_err());

        let cli = Cli::try_parse_from([
            "jiracmd",
            "create",
            "--type",
            "Bug",
            "--component",
            "Backend",
            "--summary",
            "Crash",
            "--json",
        ])
        .unwrap();
        assert!(cli.command.wants_json());
    }

    #[test]
    fn test_bulk_requires_state() {
        assert!(Cli::try_parse_from(["jiracmd", "bulk", "TEST", "11300"]).is_err());
    }
}
