//! In-memory issue service for testing.
//!
//! Holds projects, issues, filters, canned search results and per-status
//! workflows in RAM, and records every call it receives so tests can assert
//! how many remote calls an operation made, with which arguments, in which
//! order.

use crate::domain::{
    Filter, Issue, IssueLink, LinkDirection, NewIssue, Project, SearchResult, Status, Transition,
    TransitionId,
};
use crate::errors::{JiraError, Result};
use crate::remote::IssueService;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A call received by [`InMemoryIssueService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    GetProject(String),
    GetAllProjects,
    GetIssue(String),
    Search(String),
    GetFilter(u64),
    GetTransitions(String),
    ApplyTransition {
        issue_key: String,
        transition_id: TransitionId,
    },
    CreateIssue(NewIssue),
    CreateLink {
        source_key: String,
        target_key: String,
        link_type: String,
    },
    GetLinkTypes,
    UploadAttachment {
        issue_key: String,
        file: PathBuf,
    },
}

impl ServiceCall {
    /// True for calls that change remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ServiceCall::ApplyTransition { .. }
                | ServiceCall::CreateIssue(_)
                | ServiceCall::CreateLink { .. }
                | ServiceCall::UploadAttachment { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct CannedQuery {
    keys: Vec<String>,
    total: Option<u64>,
}

#[derive(Debug, Default)]
struct ServiceState {
    projects: Vec<Project>,
    issues: Vec<Issue>,
    filters: HashMap<u64, Filter>,
    queries: HashMap<String, CannedQuery>,
    workflows: HashMap<String, Vec<Transition>>,
    link_types: Vec<String>,
    failing_transitions: HashSet<String>,
    attachments: Vec<(String, PathBuf)>,
    calls: Vec<ServiceCall>,
}

/// In-memory issue service.
///
/// Uses `Rc<RefCell<>>` for shared interior mutability: clones share the same
/// data, so a test can hand one clone to the code under test and inspect
/// recorded calls through another.
///
/// Search does not interpret JQL; queries must be registered with
/// [`with_query`](Self::with_query). Transitions are looked up by the issue's
/// current status name and applying one moves the issue to its `to` status.
#[derive(Clone, Default)]
#[allow(dead_code)] // Public API used only in tests, not in binary
pub struct InMemoryIssueService {
    state: Rc<RefCell<ServiceState>>,
}

#[allow(dead_code)] // Public API used only in tests, not in binary
impl InMemoryIssueService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, project: Project) -> Self {
        self.state.borrow_mut().projects.push(project);
        self
    }

    pub fn with_issue(self, issue: Issue) -> Self {
        self.state.borrow_mut().issues.push(issue);
        self
    }

    pub fn with_filter(self, id: u64, name: &str, jql: &str) -> Self {
        self.state.borrow_mut().filters.insert(
            id,
            Filter {
                id,
                name: name.to_string(),
                jql: jql.to_string(),
            },
        );
        self
    }

    /// Register the ordered issue keys a JQL query returns.
    pub fn with_query(self, jql: &str, keys: &[&str]) -> Self {
        self.register_query(jql, keys, None)
    }

    /// Register a query whose reported total exceeds the returned keys.
    pub fn with_truncated_query(self, jql: &str, keys: &[&str], total: u64) -> Self {
        self.register_query(jql, keys, Some(total))
    }

    fn register_query(self, jql: &str, keys: &[&str], total: Option<u64>) -> Self {
        self.state.borrow_mut().queries.insert(
            jql.to_string(),
            CannedQuery {
                keys: keys.iter().map(|k| k.to_string()).collect(),
                total,
            },
        );
        self
    }

    /// Transitions offered to issues whose current status is `status_name`.
    pub fn with_workflow(self, status_name: &str, transitions: Vec<Transition>) -> Self {
        self.state
            .borrow_mut()
            .workflows
            .insert(status_name.to_string(), transitions);
        self
    }

    pub fn with_link_types(self, names: &[&str]) -> Self {
        self.state
            .borrow_mut()
            .link_types
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Make every `apply_transition` on `issue_key` fail remotely.
    pub fn failing_transition_for(self, issue_key: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_transitions
            .insert(issue_key.to_string());
        self
    }

    /// Current state of an issue, without recording a call.
    pub fn issue(&self, key: &str) -> Option<Issue> {
        self.state
            .borrow()
            .issues
            .iter()
            .find(|i| i.key == key)
            .cloned()
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of recorded calls matching a predicate.
    pub fn count_calls(&self, predicate: impl Fn(&ServiceCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| predicate(*c)).count()
    }

    /// `(issue_key, transition_id)` of every `apply_transition` call, in order.
    pub fn applied_transitions(&self) -> Vec<(String, TransitionId)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                ServiceCall::ApplyTransition {
                    issue_key,
                    transition_id,
                } => Some((issue_key.clone(), *transition_id)),
                _ => None,
            })
            .collect()
    }

    /// Attachments uploaded so far as `(issue_key, file)`.
    pub fn attachments(&self) -> Vec<(String, PathBuf)> {
        self.state.borrow().attachments.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, call: ServiceCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn issue_or_404(&self, key: &str) -> Result<Issue> {
        self.issue(key)
            .ok_or_else(|| JiraError::remote(404, "Issue Does Not Exist"))
    }
}

impl IssueService for InMemoryIssueService {
    fn get_project(&self, key: &str) -> Result<Project> {
        self.record(ServiceCall::GetProject(key.to_string()));
        self.state
            .borrow()
            .projects
            .iter()
            .find(|p| p.key == key)
            .cloned()
            .ok_or_else(|| JiraError::ProjectNotFound {
                key: key.to_string(),
            })
    }

    fn get_all_projects(&self) -> Result<Vec<Project>> {
        self.record(ServiceCall::GetAllProjects);
        Ok(self.state.borrow().projects.clone())
    }

    fn get_issue(&self, key: &str) -> Result<Issue> {
        self.record(ServiceCall::GetIssue(key.to_string()));
        self.issue_or_404(key)
    }

    fn search(&self, jql: &str) -> Result<SearchResult> {
        self.record(ServiceCall::Search(jql.to_string()));
        let state = self.state.borrow();
        let canned = state.queries.get(jql).ok_or_else(|| {
            JiraError::remote(400, format!("Error in the JQL Query: '{}'", jql))
        })?;

        let issues: Vec<Issue> = canned
            .keys
            .iter()
            .filter_map(|key| state.issues.iter().find(|i| &i.key == key).cloned())
            .collect();
        let total = canned.total.unwrap_or(issues.len() as u64);
        Ok(SearchResult { issues, total })
    }

    fn get_filter(&self, id: u64) -> Result<Filter> {
        self.record(ServiceCall::GetFilter(id));
        self.state.borrow().filters.get(&id).cloned().ok_or_else(|| {
            JiraError::remote(
                400,
                format!("The selected filter is not available to you, perhaps it has been deleted or had its permissions changed. ({})", id),
            )
        })
    }

    fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        self.record(ServiceCall::GetTransitions(issue_key.to_string()));
        let issue = self.issue_or_404(issue_key)?;
        Ok(self
            .state
            .borrow()
            .workflows
            .get(&issue.status.name)
            .cloned()
            .unwrap_or_default())
    }

    fn apply_transition(&self, issue_key: &str, transition_id: TransitionId) -> Result<()> {
        self.record(ServiceCall::ApplyTransition {
            issue_key: issue_key.to_string(),
            transition_id,
        });

        if self.state.borrow().failing_transitions.contains(issue_key) {
            return Err(JiraError::remote(
                500,
                format!("Internal server error while transitioning {}", issue_key),
            ));
        }

        let issue = self.issue_or_404(issue_key)?;
        let mut state = self.state.borrow_mut();
        let transition = state
            .workflows
            .get(&issue.status.name)
            .and_then(|ts| ts.iter().find(|t| t.id == transition_id))
            .cloned()
            .ok_or_else(|| {
                JiraError::remote(
                    400,
                    format!("Transition id '{}' is not valid for this issue.", transition_id),
                )
            })?;

        if let Some(to) = transition.to {
            if let Some(stored) = state.issues.iter_mut().find(|i| i.key == issue_key) {
                stored.status = to;
            }
        }
        Ok(())
    }

    fn create_issue(&self, input: &NewIssue) -> Result<String> {
        self.record(ServiceCall::CreateIssue(input.clone()));
        let mut state = self.state.borrow_mut();

        let project = state
            .projects
            .iter()
            .find(|p| p.key == input.project_key)
            .ok_or_else(|| JiraError::remote(400, "project: valid project is required"))?;
        if !project.issue_types.iter().any(|t| t.id == input.issue_type_id) {
            return Err(JiraError::remote(400, "issuetype: valid issue type is required"));
        }
        if !project.components.iter().any(|c| c.id == input.component_id) {
            return Err(JiraError::remote(
                400,
                format!("components: Component with id '{}' does not exist.", input.component_id),
            ));
        }

        let number = state
            .issues
            .iter()
            .filter(|i| i.key.starts_with(&format!("{}-", input.project_key)))
            .count()
            + 1;
        let key = format!("{}-{}", input.project_key, number);
        let mut issue = Issue::new(key.clone(), input.summary.clone(), Status::new("1", "Open"));
        issue.description = Some(input.description.clone());
        state.issues.push(issue);
        Ok(key)
    }

    fn create_link(&self, source_key: &str, target_key: &str, link_type: &str) -> Result<()> {
        self.record(ServiceCall::CreateLink {
            source_key: source_key.to_string(),
            target_key: target_key.to_string(),
            link_type: link_type.to_string(),
        });
        self.issue_or_404(source_key)?;
        self.issue_or_404(target_key)?;

        let mut state = self.state.borrow_mut();
        if !state.link_types.iter().any(|name| name == link_type) {
            return Err(JiraError::remote(
                404,
                format!("No issue link type with name '{}' found.", link_type),
            ));
        }
        for issue in state.issues.iter_mut() {
            if issue.key == source_key {
                issue.links.push(IssueLink {
                    target_key: target_key.to_string(),
                    link_type: link_type.to_string(),
                    direction: LinkDirection::Outbound,
                });
            } else if issue.key == target_key {
                issue.links.push(IssueLink {
                    target_key: source_key.to_string(),
                    link_type: link_type.to_string(),
                    direction: LinkDirection::Inbound,
                });
            }
        }
        Ok(())
    }

    fn get_link_types(&self) -> Result<Vec<String>> {
        self.record(ServiceCall::GetLinkTypes);
        Ok(self.state.borrow().link_types.clone())
    }

    fn upload_attachment(&self, issue_key: &str, file: &Path) -> Result<()> {
        self.record(ServiceCall::UploadAttachment {
            issue_key: issue_key.to_string(),
            file: file.to_path_buf(),
        });
        self.issue_or_404(issue_key)?;
        if !file.is_file() {
            return Err(JiraError::Io {
                path: file.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        self.state
            .borrow_mut()
            .attachments
            .push((issue_key.to_string(), file.to_path_buf()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Component, IssueType};

    fn open() -> Status {
        Status::new("1", "Open")
    }

    fn done() -> Status {
        Status::new("3", "Done")
    }

    #[test]
    fn test_clones_share_state() {
        let service = InMemoryIssueService::new().with_issue(Issue::new("T-1", "one", open()));
        let observer = service.clone();

        service.get_issue("T-1").unwrap();

        assert_eq!(observer.calls(), vec![ServiceCall::GetIssue("T-1".to_string())]);
    }

    #[test]
    fn test_search_returns_registered_order() {
        let service = InMemoryIssueService::new()
            .with_issue(Issue::new("T-1", "one", open()))
            .with_issue(Issue::new("T-2", "two", open()))
            .with_query("q", &["T-2", "T-1"]);

        let result = service.search("q").unwrap();
        let keys: Vec<_> = result.issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["T-2", "T-1"]);
        assert_eq!(result.total, 2);
    }

    #[test]
    fn test_unknown_query_is_remote_error() {
        let service = InMemoryIssueService::new();
        let err = service.search("nonsense ===").unwrap_err();
        assert!(err.is_remote());
    }

    #[test]
    fn test_apply_transition_moves_status() {
        let service = InMemoryIssueService::new()
            .with_issue(Issue::new("T-1", "one", open()))
            .with_workflow("Open", vec![Transition::new(31, "Done").with_target_status(done())]);

        service.apply_transition("T-1", 31).unwrap();

        assert_eq!(service.issue("T-1").unwrap().status, done());
    }

    #[test]
    fn test_apply_transition_rejects_unavailable_id() {
        let service = InMemoryIssueService::new()
            .with_issue(Issue::new("T-1", "one", done()))
            .with_workflow("Open", vec![Transition::new(31, "Done")]);

        let err = service.apply_transition("T-1", 31).unwrap_err();
        assert!(err.to_string().contains("not valid for this issue"));
    }

    #[test]
    fn test_create_issue_generates_sequential_keys() {
        let mut project = Project::new("T", "Test");
        project.issue_types.push(IssueType {
            id: "10".to_string(),
            name: "Bug".to_string(),
        });
        project.components.push(Component {
            id: "20".to_string(),
            name: "UI".to_string(),
        });
        let service = InMemoryIssueService::new().with_project(project);
        let input = NewIssue {
            project_key: "T".to_string(),
            issue_type_id: "10".to_string(),
            component_id: "20".to_string(),
            summary: "crash".to_string(),
            description: "on start".to_string(),
        };

        assert_eq!(service.create_issue(&input).unwrap(), "T-1");
        assert_eq!(service.create_issue(&input).unwrap(), "T-2");
        assert_eq!(service.count_calls(ServiceCall::is_mutation), 2);
    }

    #[test]
    fn test_create_link_records_both_directions() {
        let service = InMemoryIssueService::new()
            .with_issue(Issue::new("T-1", "one", open()))
            .with_issue(Issue::new("T-2", "two", open()))
            .with_link_types(&["Blocks"]);

        service.create_link("T-1", "T-2", "Blocks").unwrap();

        assert!(service.issue("T-1").unwrap().is_linked_to("T-2"));
        let inbound = service.issue("T-2").unwrap();
        assert_eq!(inbound.links[0].direction, LinkDirection::Inbound);
    }
}
