//! Idempotent issue linking.

use super::*;
use serde::Serialize;

/// What [`CommandExecutor::link_issues`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    /// A new link was created remotely
    Created,
    /// The source already links to the target; nothing was sent
    AlreadyLinked,
}

impl<R: IssueService> CommandExecutor<R> {
    /// Link `source_key` to `target_key` with `link_type`, unless the source
    /// already carries a link to the target.
    ///
    /// The existing-link check compares target keys only: a link of any type
    /// to the same target counts as present. The link type is validated
    /// against the session's cached link types before anything is fetched.
    pub fn link_issues(
        &self,
        source_key: &str,
        target_key: &str,
        link_type: &str,
    ) -> Result<LinkOutcome> {
        let link_type = self.metadata.find_link_type(link_type).ok_or_else(|| {
            JiraError::InvalidLinkType {
                name: link_type.to_string(),
                valid: self.metadata.link_type_names().to_vec(),
            }
        })?;

        let source = self.service.get_issue(source_key)?;
        if source.is_linked_to(target_key) {
            warn!(
                from = source_key,
                to = target_key,
                "skipping issue link creation; link already present"
            );
            return Ok(LinkOutcome::AlreadyLinked);
        }

        info!(from = source_key, link_type, to = target_key, "creating link");
        self.service.create_link(source_key, target_key, link_type)?;
        Ok(LinkOutcome::Created)
    }
}
