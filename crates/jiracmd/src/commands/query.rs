//! Resolving query specifiers into ordered issue sets.
//!
//! A filter is only a stored query: resolving one fetches its JQL and then
//! follows exactly the same path as an ad-hoc query.

use super::*;
use serde::Serialize;

/// Issues resolved from a filter or query, in remote order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueSet {
    pub issues: Vec<Issue>,
    /// Total matches reported by the remote; may exceed `issues.len()`
    pub total: u64,
}

impl IssueSet {
    pub fn empty() -> Self {
        Self {
            issues: Vec::new(),
            total: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// True when more issues matched than were returned.
    pub fn is_truncated(&self) -> bool {
        self.total > self.issues.len() as u64
    }

    pub fn keys(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.key.as_str()).collect()
    }
}

impl<R: IssueService> CommandExecutor<R> {
    /// Resolve either kind of specifier.
    pub fn resolve_issues(&self, spec: &QuerySpec) -> Result<IssueSet> {
        match spec {
            QuerySpec::Filter(id) => self.resolve_filter(*id),
            QuerySpec::Jql(jql) => self.resolve_query(jql),
        }
    }

    /// Run a saved filter.
    pub fn resolve_filter(&self, filter_id: u64) -> Result<IssueSet> {
        info!(filter_id, "getting issues using filter");
        let filter = self.service.get_filter(filter_id)?;
        debug!(filter_id, name = %filter.name, jql = %filter.jql, "filter resolved");
        self.resolve_query(&filter.jql)
    }

    /// Run a JQL query.
    ///
    /// Zero matches is an empty set, not an error. When the remote reports
    /// more matches than it returned, the returned subset is kept and the
    /// truncation is logged; callers see it through [`IssueSet::is_truncated`].
    pub fn resolve_query(&self, jql: &str) -> Result<IssueSet> {
        debug!(%jql, "searching");
        let result = self.service.search(jql)?;
        debug!(total = result.total, returned = result.returned(), "search finished");

        if result.total == 0 {
            return Ok(IssueSet::empty());
        }
        if result.is_truncated() {
            warn!(
                total = result.total,
                returned = result.returned(),
                "search returned only part of the matching issues"
            );
        }

        Ok(IssueSet {
            total: result.total,
            issues: result.issues,
        })
    }
}
