//! Integration tests for issue creation and idempotent linking


use harness::TestHarness;
use jiracmd::domain::{LinkDirection, NewIssue};
use jiracmd::errors::ErrorKind;
use jiracmd::remote::ServiceCall;
use jiracmd::LinkOutcome;

#[test]
fn test_linking_twice_creates_one_link() {
    let (h, _) = TestHarness::new().with_open_issues(2);
    let executor = h.connect();

    assert_eq!(
        executor.link_issues("PROJ-1", "PROJ-2", "Blocks").unwrap(),
        LinkOutcome::Created
    );
    assert_eq!(
        executor.link_issues("PROJ-1", "PROJ-2", "Blocks").unwrap(),
        LinkOutcome::AlreadyLinked
    );

    assert_eq!(h.count(|c| matches!(c, ServiceCall::CreateLink { .. })), 1);
    let source = h.service().issue("PROJ-1").unwrap();
    assert_eq!(source.links.len(), 1);
    assert_eq!(source.links[0].direction, LinkDirection::Outbound);
}

#[test]
fn test_inbound_link_does_not_block_reverse_link() {
    let (h, _) = TestHarness::new().with_open_issues(2);
    let executor = h.connect();

    executor.link_issues("PROJ-2", "PROJ-1", "Blocks").unwrap();
    let outcome = executor.link_issues("PROJ-1", "PROJ-2", "Blocks").unwrap();

    assert_eq!(outcome, LinkOutcome::Created);
    assert_eq!(h.count(|c| matches!(c, ServiceCall::CreateLink { .. })), 2);
}

#[test]
fn test_invalid_link_type_makes_no_remote_call() {
    let (h, _) = TestHarness::new().with_open_issues(2);
    let executor = h.connect();
    h.service().clear_calls();

    let err = executor
        .link_issues("PROJ-1", "PROJ-2", "Relates")
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err
        .to_string()
        .contains("[Blocks, Cloners, Duplicate]"));
    assert!(h.service().calls().is_empty());
}

#[test]
fn test_link_type_match_ignores_case() {
    let (h, _) = TestHarness::new().with_open_issues(2);
    let executor = h.connect();

    executor.link_issues("PROJ-1", "PROJ-2", "cLoNeRs").unwrap();

    assert_eq!(h.service().issue("PROJ-2").unwrap().links[0].link_type, "Cloners");
}

#[test]
fn test_create_issue_with_resolved_identifiers() {
    let h = TestHarness::new();
    let executor = h.connect();

    let key = executor
        .create_issue("new feature", "web ui", "Dark mode", "Add a dark theme")
        .unwrap();

    assert_eq!(key, "PROJ-1");
    assert!(h.service().calls().contains(&ServiceCall::CreateIssue(NewIssue {
        project_key: "PROJ".to_string(),
        issue_type_id: "2".to_string(),
        component_id: "101".to_string(),
        summary: "Dark mode".to_string(),
        description: "Add a dark theme".to_string(),
    })));
    assert_eq!(h.status_of("PROJ-1"), "Open");
}

#[test]
fn test_create_issue_rejects_unknown_names_without_remote_call() {
    let h = TestHarness::new();
    let executor = h.connect();

    let bad_type = executor
        .create_issue("Epic", "Core", "s", "d")
        .unwrap_err();
    assert!(bad_type
        .to_string()
        .contains("invalid issue type: Epic. valid types are: [Bug, New Feature]"));

    let bad_component = executor
        .create_issue("Bug", "Database", "s", "d")
        .unwrap_err();
    assert!(bad_component
        .to_string()
        .contains("invalid component: Database. valid values are: [Core, Web UI]"));

    assert_eq!(h.mutation_count(), 0);
}

#[test]
fn test_connect_to_unknown_project_fails() {
    let h = TestHarness::new();
    let err = jiracmd::CommandExecutor::connect(h.service().clone(), "NOPE")
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
