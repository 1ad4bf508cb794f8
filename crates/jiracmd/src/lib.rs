//! jiracmd library
//!
//! Bulk operations against a JIRA server: resolve a saved filter or JQL
//! query into an issue set, move the whole set through a workflow
//! transition, create issues, link them idempotently and upload
//! attachments. The binary is a thin CLI over [`CommandExecutor`]; tests
//! drive the same executor against [`InMemoryIssueService`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod metadata;
pub mod output;
pub mod remote;

// Re-export commonly used types
pub use commands::{BulkTransitionReport, CommandExecutor, IssueSet, LinkOutcome};
pub use config::JiraConfig;
pub use domain::{Issue, QuerySpec, TransitionId};
pub use errors::{ErrorKind, JiraError};
pub use metadata::MetadataCache;
pub use output::{ExitCode, JsonError, JsonOutput};
pub use remote::{HttpIssueService, InMemoryIssueService, IssueService};
