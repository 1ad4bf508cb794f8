//! Core domain types for the JIRA client.
//!
//! This module defines the data the client reads from and writes to the remote
//! issue tracker: projects and their metadata, issues, workflow transitions,
//! search results, and the query specifier that selects an issue set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote identifier of a workflow transition.
pub type TransitionId = u64;

/// Case-insensitive name comparison used for every user-supplied name.
pub fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// An issue type valid for a project (e.g. "Bug").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueType {
    /// Opaque remote identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
}

/// A component of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Opaque remote identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
}

/// A project with its issue types and components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project key (e.g. "PROJ")
    pub key: String,
    /// Display name
    pub name: String,
    /// Issue types usable in this project, in remote order
    #[serde(default)]
    pub issue_types: Vec<IssueType>,
    /// Components defined for this project, in remote order
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Project {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            issue_types: Vec::new(),
            components: Vec::new(),
        }
    }
}

/// Current workflow status of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    pub name: String,
}

impl Status {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Direction of a link as seen from the issue that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    Outbound,
    Inbound,
}

/// A relationship stored on an issue, pointing at another issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    /// Key of the issue at the other end of the link
    pub target_key: String,
    /// Link type name (e.g. "Blocks")
    pub link_type: String,
    pub direction: LinkDirection,
}

/// An issue as fetched from the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue key (e.g. "PROJ-123")
    pub key: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: Status,
    /// Links carried by this issue
    #[serde(default)]
    pub links: Vec<IssueLink>,
}

impl Issue {
    pub fn new(key: impl Into<String>, summary: impl Into<String>, status: Status) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            description: None,
            status,
            links: Vec::new(),
        }
    }

    /// Whether an outbound link on this issue points at `target_key`,
    /// regardless of link type. Inbound links are not considered.
    pub fn is_linked_to(&self, target_key: &str) -> bool {
        self.links
            .iter()
            .filter(|link| link.direction == LinkDirection::Outbound)
            .any(|link| link.target_key == target_key)
    }
}

/// A workflow transition available from an issue's current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    pub name: String,
    /// Status the issue lands in after the transition, when the remote reports it
    pub to: Option<Status>,
}

impl Transition {
    pub fn new(id: TransitionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            to: None,
        }
    }

    pub fn with_target_status(mut self, status: Status) -> Self {
        self.to = Some(status);
        self
    }
}

/// A saved query stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub id: u64,
    pub name: String,
    pub jql: String,
}

/// Result of a remote search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Issues actually returned, in remote order
    pub issues: Vec<Issue>,
    /// Total number of matches the remote reports
    pub total: u64,
}

impl SearchResult {
    /// Number of issues actually returned.
    pub fn returned(&self) -> u64 {
        self.issues.len() as u64
    }

    /// True when the remote holds more matches than it returned.
    pub fn is_truncated(&self) -> bool {
        self.total > self.returned()
    }
}

/// Input for creating an issue, already resolved to remote identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub project_key: String,
    pub issue_type_id: String,
    pub component_id: String,
    pub summary: String,
    pub description: String,
}

/// Selects an issue set: either a saved filter or an ad-hoc JQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySpec {
    Filter(u64),
    Jql(String),
}

impl QuerySpec {
    /// Interpret command-line input: an unsigned integer is a filter id,
    /// anything else is JQL.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<u64>() {
            Ok(id) => QuerySpec::Filter(id),
            Err(_) => QuerySpec::Jql(input.to_string()),
        }
    }
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuerySpec::Filter(id) => write!(f, "filter {}", id),
            QuerySpec::Jql(jql) => write!(f, "JQL '{}'", jql),
        }
    }
}
