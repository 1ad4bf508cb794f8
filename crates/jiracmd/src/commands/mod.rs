//! Command execution logic for all CLI operations.
//!
//! The `CommandExecutor` owns the remote service handle and the session's
//! metadata cache, and hosts every operation the CLI exposes.
//!
//! This module is organized into submodules by functional area:
//! - `query`: resolving a filter id or JQL into an ordered issue set
//! - `transition`: resolving a target state name into a transition id
//! - `bulk_transition`: moving a whole issue set to a target state
//! - `link`: idempotent issue linking
//! - `issue`: issue creation, lookup, project listing and attachments

pub mod bulk_transition;
mod issue;
pub mod link;
pub mod query;
mod transition;

#[cfg(test)]
pub mod test_helpers;

pub use bulk_transition::BulkTransitionReport;
pub use link::LinkOutcome;
pub use query::IssueSet;

// Common imports used across modules
use crate::domain::{Issue, QuerySpec, TransitionId};
use crate::errors::{JiraError, Result};
use crate::metadata::MetadataCache;
use crate::remote::IssueService;
use tracing::{debug, info, warn};

/// Executes CLI commands against a remote issue service.
///
/// Generic over the service backend so the same logic runs against the
/// HTTP client and the in-memory test double. The service is injected once
/// and every operation goes through it; nothing is shared globally.
pub struct CommandExecutor<R: IssueService> {
    service: R,
    metadata: MetadataCache,
}

impl<R: IssueService> CommandExecutor<R> {
    /// Start a session: load the project's metadata through `service`.
    ///
    /// # Errors
    ///
    /// Fails if the project key does not resolve or link types cannot be
    /// fetched; no executor exists without a complete metadata cache.
    pub fn connect(service: R, project_key: &str) -> Result<Self> {
        let metadata = MetadataCache::load(&service, project_key)?;
        Ok(Self { service, metadata })
    }

    /// Get reference to the service backend
    pub fn service(&self) -> &R {
        &self.service
    }
}
