//! Test helper functions for command tests.
//!
//! Provides a small fixed project and workflow so command tests only set up
//! what they are actually about.

use crate::commands::CommandExecutor;
use crate::domain::{Component, Issue, IssueType, Project, Status, Transition, TransitionId};
use crate::remote::InMemoryIssueService;

pub const PROJECT_KEY: &str = "TEST";
pub const BUG_TYPE_ID: &str = "1";
pub const TASK_TYPE_ID: &str = "3";
pub const BACKEND_COMPONENT_ID: &str = "10000";
pub const FRONTEND_COMPONENT_ID: &str = "10001";

pub const START_ID: TransitionId = 21;
pub const DONE_ID: TransitionId = 31;
pub const REOPEN_ID: TransitionId = 41;

pub fn open() -> Status {
    Status::new("1", "Open")
}

pub fn in_progress() -> Status {
    Status::new("3", "In Progress")
}

pub fn done() -> Status {
    Status::new("10001", "Done")
}

/// Project "TEST" with types Bug and Task and components Backend and Frontend.
pub fn sample_project() -> Project {
    let mut project = Project::new(PROJECT_KEY, "Test Project");
    project.issue_types = vec![
        IssueType {
            id: BUG_TYPE_ID.to_string(),
            name: "Bug".to_string(),
        },
        IssueType {
            id: TASK_TYPE_ID.to_string(),
            name: "Task".to_string(),
        },
    ];
    project.components = vec![
        Component {
            id: BACKEND_COMPONENT_ID.to_string(),
            name: "Backend".to_string(),
        },
        Component {
            id: FRONTEND_COMPONENT_ID.to_string(),
            name: "Frontend".to_string(),
        },
    ];
    project
}

/// A service holding the sample project, link types Blocks and Relates,
/// and one issue in status Open for every key.
///
/// Workflow: Open offers "In Progress" and "Done", In Progress offers
/// "Done" and "Open", Done offers only "Reopen".
pub fn service_with_open_issues(keys: &[&str]) -> InMemoryIssueService {
    let service = InMemoryIssueService::new()
        .with_project(sample_project())
        .with_link_types(&["Blocks", "Relates"])
        .with_workflow(
            "Open",
            vec![
                Transition::new(START_ID, "In Progress").with_target_status(in_progress()),
                Transition::new(DONE_ID, "Done").with_target_status(done()),
            ],
        )
        .with_workflow(
            "In Progress",
            vec![
                Transition::new(DONE_ID, "Done").with_target_status(done()),
                Transition::new(REOPEN_ID, "Open").with_target_status(open()),
            ],
        )
        .with_workflow(
            "Done",
            vec![Transition::new(REOPEN_ID, "Reopen").with_target_status(open())],
        );

    keys.iter().fold(service, |service, key| {
        service.with_issue(Issue::new(*key, format!("Issue {}", key), open()))
    })
}

/// Connect an executor to `service` for the sample project.
pub fn setup(service: InMemoryIssueService) -> CommandExecutor<InMemoryIssueService> {
    CommandExecutor::connect(service, PROJECT_KEY).unwrap()
}
