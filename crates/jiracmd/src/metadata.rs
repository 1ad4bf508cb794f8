//! Per-session cache of project metadata.
//!
//! Issue types, components and link-type names are fetched once when a
//! session starts and never refreshed afterwards. Lookups are
//! case-insensitive linear scans; the sets are bounded by project
//! configuration and stay small.

use crate::domain::{names_match, Component, IssueType, Project};
use crate::errors::Result;
use crate::remote::IssueService;
use tracing::debug;

/// Read-only metadata for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCache {
    project: Project,
    link_types: Vec<String>,
}

impl MetadataCache {
    /// Fetch the project and the instance-wide link types.
    ///
    /// Fails as a whole if the project key does not resolve; no partial cache
    /// is ever returned.
    pub fn load<R: IssueService>(service: &R, project_key: &str) -> Result<Self> {
        let project = service.get_project(project_key)?;
        let link_types = service.get_link_types()?;
        debug!(
            project = %project.key,
            issue_types = project.issue_types.len(),
            components = project.components.len(),
            link_types = link_types.len(),
            "loaded project metadata"
        );
        Ok(Self::from_parts(project, link_types))
    }

    pub fn from_parts(project: Project, link_types: Vec<String>) -> Self {
        Self {
            project,
            link_types,
        }
    }

    pub fn project_key(&self) -> &str {
        &self.project.key
    }

    pub fn find_issue_type(&self, name: &str) -> Option<&IssueType> {
        self.project
            .issue_types
            .iter()
            .find(|t| names_match(&t.name, name))
    }

    pub fn find_component(&self, name: &str) -> Option<&Component> {
        self.project
            .components
            .iter()
            .find(|c| names_match(&c.name, name))
    }

    pub fn is_valid_link_type(&self, name: &str) -> bool {
        self.find_link_type(name).is_some()
    }

    /// The link type's name as the remote spells it.
    pub fn find_link_type(&self, name: &str) -> Option<&str> {
        self.link_types
            .iter()
            .find(|t| names_match(t, name))
            .map(String::as_str)
    }

    pub fn issue_type_names(&self) -> Vec<String> {
        self.project
            .issue_types
            .iter()
            .map(|t| t.name.clone())
            .collect()
    }

    pub fn component_names(&self) -> Vec<String> {
        self.project
            .components
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn link_type_names(&self) -> &[String] {
        &self.link_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{InMemoryIssueService, ServiceCall};
    use proptest::prelude::*;

    fn sample_project() -> Project {
        let mut project = Project::new("TEST", "Test project");
        project.issue_types = vec![
            IssueType {
                id: "1".to_string(),
                name: "Bug".to_string(),
            },
            IssueType {
                id: "2".to_string(),
                name: "Story".to_string(),
            },
        ];
        project.components = vec![Component {
            id: "10".to_string(),
            name: "Backend".to_string(),
        }];
        project
    }

    fn sample_cache() -> MetadataCache {
        MetadataCache::from_parts(
            sample_project(),
            vec!["Blocks".to_string(), "Relates to".to_string()],
        )
    }

    #[test]
    fn test_load_fetches_project_and_link_types_once() {
        let service = InMemoryIssueService::new()
            .with_project(sample_project())
            .with_link_types(&["Blocks"]);

        let cache = MetadataCache::load(&service, "TEST").unwrap();

        assert_eq!(cache.project_key(), "TEST");
        assert_eq!(
            service.calls(),
            vec![
                ServiceCall::GetProject("TEST".to_string()),
                ServiceCall::GetLinkTypes
            ]
        );
    }

    #[test]
    fn test_load_unknown_project_fails() {
        let service = InMemoryIssueService::new().with_link_types(&["Blocks"]);
        let err = MetadataCache::load(&service, "NOPE").unwrap_err();
        assert!(err.to_string().contains("project NOPE not found"));
    }

    #[test]
    fn test_lookups_ignore_case() {
        let cache = sample_cache();
        assert_eq!(cache.find_issue_type("bug").unwrap().id, "1");
        assert_eq!(cache.find_issue_type("STORY").unwrap().id, "2");
        assert_eq!(cache.find_component("backend").unwrap().id, "10");
        assert!(cache.is_valid_link_type("relates TO"));
        assert_eq!(cache.find_link_type("blocks"), Some("Blocks"));
    }

    #[test]
    fn test_unknown_names() {
        let cache = sample_cache();
        assert!(cache.find_issue_type("Epic").is_none());
        assert!(cache.find_component("Frontend").is_none());
        assert!(!cache.is_valid_link_type("Duplicates"));
    }

    #[test]
    fn test_name_listings_preserve_order() {
        let cache = sample_cache();
        assert_eq!(cache.issue_type_names(), vec!["Bug", "Story"]);
        assert_eq!(cache.component_names(), vec!["Backend"]);
        assert_eq!(cache.link_type_names(), ["Blocks", "Relates to"]);
    }

    proptest! {
        #[test]
        fn prop_lookup_is_case_insensitive(name in "[A-Za-z][A-Za-z ]{0,15}") {
            let mut project = Project::new("P", "P");
            project.issue_types.push(IssueType { id: "1".to_string(), name: name.clone() });
            project.components.push(Component { id: "2".to_string(), name: name.clone() });
            let cache = MetadataCache::from_parts(project, vec![name.clone()]);

            for variant in [name.clone(), name.to_uppercase(), name.to_lowercase()] {
                prop_assert_eq!(cache.find_issue_type(&variant).map(|t| t.id.as_str()), Some("1"));
                prop_assert_eq!(cache.find_component(&variant).map(|c| c.id.as_str()), Some("2"));
                prop_assert!(cache.is_valid_link_type(&variant));
            }
        }
    }
}
