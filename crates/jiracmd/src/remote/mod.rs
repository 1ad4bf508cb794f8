//! Remote issue service abstraction.
//!
//! This module defines the `IssueService` trait: the capabilities the client
//! consumes from the issue tracker. Business logic in [`crate::commands`] is
//! written against the trait, so the HTTP backend and the in-memory backend
//! used by tests are interchangeable.
//!
//! Every call is synchronous: it blocks until the remote answers or fails.

use crate::domain::{Filter, Issue, NewIssue, Project, SearchResult, Transition, TransitionId};
use crate::errors::Result;
use std::path::Path;

pub mod http;
pub mod memory;

pub use http::HttpIssueService;

#[allow(unused_imports)] // Public API used only in tests, not in binary
pub use memory::{InMemoryIssueService, ServiceCall};

/// Capabilities consumed from the remote issue tracker.
///
/// # Examples
///
/// ```
/// use jiracmd::domain::{Issue, Status};
/// use jiracmd::remote::{InMemoryIssueService, IssueService};
///
/// let service = InMemoryIssueService::new()
///     .with_issue(Issue::new("TEST-1", "Fix login", Status::new("1", "Open")));
///
/// let issue = service.get_issue("TEST-1").unwrap();
/// assert_eq!(issue.summary, "Fix login");
/// ```
pub trait IssueService {
    /// Fetch a project with its issue types and components.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the key does not resolve remotely.
    fn get_project(&self, key: &str) -> Result<Project>;

    /// List every project visible to the authenticated account.
    fn get_all_projects(&self) -> Result<Vec<Project>>;

    /// Fetch an issue by key, including its links.
    fn get_issue(&self, key: &str) -> Result<Issue>;

    /// Run a JQL search.
    ///
    /// The result may hold fewer issues than its reported total.
    fn search(&self, jql: &str) -> Result<SearchResult>;

    /// Fetch a saved filter.
    fn get_filter(&self, id: u64) -> Result<Filter>;

    /// List transitions available from the issue's current status.
    ///
    /// Never cached: the set depends on mutable remote workflow state.
    fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>>;

    /// Apply a transition to an issue.
    fn apply_transition(&self, issue_key: &str, transition_id: TransitionId) -> Result<()>;

    /// Create an issue and return its key.
    fn create_issue(&self, input: &NewIssue) -> Result<String>;

    /// Link two issues with a named link type.
    fn create_link(&self, source_key: &str, target_key: &str, link_type: &str) -> Result<()>;

    /// Names of all link types defined on the instance.
    fn get_link_types(&self) -> Result<Vec<String>>;

    /// Upload a file as an attachment of an issue.
    fn upload_attachment(&self, issue_key: &str, file: &Path) -> Result<()>;
}
