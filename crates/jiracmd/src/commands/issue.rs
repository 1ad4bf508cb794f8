//! Issue creation, lookup, project listing and attachments

use super::*;
use crate::domain::{NewIssue, Project};
use std::path::Path;

impl<R: IssueService> CommandExecutor<R> {
    /// Create an issue in the session's project and return its key.
    ///
    /// Type and component names are resolved case-insensitively against the
    /// cached metadata before the remote is contacted, so a bad name never
    /// reaches the create call.
    pub fn create_issue(
        &self,
        issue_type: &str,
        component: &str,
        summary: &str,
        description: &str,
    ) -> Result<String> {
        let resolved_type = self.metadata.find_issue_type(issue_type).ok_or_else(|| {
            JiraError::IssueTypeNotFound {
                name: issue_type.to_string(),
                valid: self.metadata.issue_type_names(),
            }
        })?;
        let resolved_component = self.metadata.find_component(component).ok_or_else(|| {
            JiraError::ComponentNotFound {
                name: component.to_string(),
                valid: self.metadata.component_names(),
            }
        })?;

        let input = NewIssue {
            project_key: self.metadata.project_key().to_string(),
            issue_type_id: resolved_type.id.clone(),
            component_id: resolved_component.id.clone(),
            summary: summary.to_string(),
            description: description.to_string(),
        };
        info!(
            project = %input.project_key,
            issue_type = %resolved_type.name,
            component = %resolved_component.name,
            "creating issue"
        );
        debug!(summary, description, "issue content");

        let key = self.service.create_issue(&input)?;
        info!(%key, "issue created");
        Ok(key)
    }

    /// Fetch a single issue by key.
    pub fn show_issue(&self, key: &str) -> Result<Issue> {
        self.service.get_issue(key)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        self.service.get_all_projects()
    }

    /// Upload a local file as an attachment of `issue_key`.
    pub fn attach_file(&self, issue_key: &str, file: &Path) -> Result<()> {
        if !file.is_file() {
            return Err(JiraError::Io {
                path: file.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a readable file"),
            });
        }
        info!(issue = issue_key, file = %file.display(), "uploading attachment");
        self.service.upload_attachment(issue_key, file)
    }
}
