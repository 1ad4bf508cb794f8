//! Bulk transition: move every issue of a resolved set to one target state.
//!
//! The transition id is resolved once, against the first issue only, and
//! applied unchanged to every issue in order. All issues of the set are
//! assumed to share status and workflow; when they do not, the remote
//! rejects the transition for the first mismatching issue.
//!
//! Failure policy is fail-fast: an error on issue *k* stops the run. Issues
//! before *k* stay transitioned, issues from *k* on are untouched, and
//! nothing is retried or rolled back.

use super::*;
use serde::Serialize;

/// Result of a completed bulk transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkTransitionReport {
    pub target_state: String,
    /// Transition applied; `None` when the set was empty
    pub transition_id: Option<TransitionId>,
    /// Keys transitioned, in application order
    pub transitioned: Vec<String>,
    /// Matches reported by the remote search
    pub total_matched: u64,
    /// True when the search returned fewer issues than matched
    pub truncated: bool,
}

impl<R: IssueService> CommandExecutor<R> {
    /// Resolve `spec` and transition every issue it yields.
    ///
    /// `on_progress` is called with each issue right before its transition
    /// is applied.
    pub fn bulk_transition(
        &self,
        spec: &QuerySpec,
        target_state: &str,
        on_progress: impl FnMut(&Issue),
    ) -> Result<BulkTransitionReport> {
        let set = self.resolve_issues(spec)?;
        let mut report = self.transition_all(&set.issues, target_state, on_progress)?;
        report.total_matched = set.total;
        report.truncated = set.is_truncated();
        Ok(report)
    }

    pub fn bulk_transition_by_filter(
        &self,
        filter_id: u64,
        target_state: &str,
        on_progress: impl FnMut(&Issue),
    ) -> Result<BulkTransitionReport> {
        self.bulk_transition(&QuerySpec::Filter(filter_id), target_state, on_progress)
    }

    pub fn bulk_transition_by_query(
        &self,
        jql: &str,
        target_state: &str,
        on_progress: impl FnMut(&Issue),
    ) -> Result<BulkTransitionReport> {
        self.bulk_transition(&QuerySpec::Jql(jql.to_string()), target_state, on_progress)
    }

    /// Transition `issues` in order, strictly one at a time.
    ///
    /// # Errors
    ///
    /// Returns the first resolution or remote error unchanged; later issues
    /// are never attempted.
    pub fn transition_all(
        &self,
        issues: &[Issue],
        target_state: &str,
        mut on_progress: impl FnMut(&Issue),
    ) -> Result<BulkTransitionReport> {
        let mut report = BulkTransitionReport {
            target_state: target_state.to_string(),
            transition_id: None,
            transitioned: Vec::with_capacity(issues.len()),
            total_matched: issues.len() as u64,
            truncated: false,
        };

        let Some(first) = issues.first() else {
            info!(target_state, "no issues to transition");
            return Ok(report);
        };

        let transition_id = self.resolve_transition(first, target_state)?;
        debug!(transition_id, issue = %first.key, "transition resolved");
        report.transition_id = Some(transition_id);

        for (index, issue) in issues.iter().enumerate() {
            on_progress(issue);
            info!(issue = %issue.key, from = %issue.status, to = target_state, "transitioning");

            if let Err(e) = self.service.apply_transition(&issue.key, transition_id) {
                warn!(
                    issue = %issue.key,
                    completed = index,
                    skipped = issues.len() - index - 1,
                    "bulk transition aborted"
                );
                return Err(e);
            }
            report.transitioned.push(issue.key.clone());
        }

        Ok(report)
    }
}
