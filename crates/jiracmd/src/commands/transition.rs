//! Resolving a target state name into a workflow transition.

use super::*;
use crate::domain::names_match;

impl<R: IssueService> CommandExecutor<R> {
    /// Find the transition named `target_state` among those available from
    /// the issue's current status.
    ///
    /// Transitions are fetched live on every call. Names compare
    /// case-insensitively and the first match in remote order wins.
    ///
    /// # Errors
    ///
    /// `TransitionNotFound` when nothing matches. From the outside this is
    /// indistinguishable from missing permissions, and the message says so.
    pub fn resolve_transition(&self, issue: &Issue, target_state: &str) -> Result<TransitionId> {
        let transitions = self.service.get_transitions(&issue.key)?;

        for transition in &transitions {
            debug!(issue = %issue.key, id = transition.id, name = %transition.name, "transition");
        }

        transitions
            .iter()
            .find(|t| names_match(&t.name, target_state))
            .map(|t| t.id)
            .ok_or_else(|| JiraError::TransitionNotFound {
                issue_key: issue.key.clone(),
                status: issue.status.name.clone(),
                target: target_state.to_string(),
            })
    }
}
