//! Error types for remote and validation failures.
//!
//! [`JiraError`] is the error returned by every library operation. Its
//! [`ErrorKind`] lets callers tell remote failures (the tracker rejected or
//! never answered a request) apart from validation failures raised locally
//! before any mutation is attempted.
//!
//! [`ActionableError`] formats startup problems with possible causes and
//! remediation steps.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, JiraError>;

/// One error report from the remote service.
///
/// Mirrors the JIRA error body (`errorMessages` plus field `errors`) together
/// with the HTTP status of the response that carried it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorCollection {
    #[serde(skip)]
    pub status: Option<u16>,
    #[serde(default, rename = "errorMessages")]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl ErrorCollection {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            error_messages: vec![message.into()],
            errors: BTreeMap::new(),
        }
    }

    /// All messages of this collection, field errors rendered as `field: message`.
    pub fn messages(&self) -> Vec<String> {
        self.error_messages
            .iter()
            .cloned()
            .chain(
                self.errors
                    .iter()
                    .map(|(field, msg)| format!("{}: {}", field, msg)),
            )
            .collect()
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "({})", status)?,
            None => write!(f, "(no status)")?,
        }
        write!(f, " [{}]", self.messages().join(", "))
    }
}

/// The remote service rejected a request.
///
/// Carries every collection the remote reported; the message concatenates
/// all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub collections: Vec<ErrorCollection>,
}

impl RemoteError {
    pub fn new(collections: Vec<ErrorCollection>) -> Self {
        Self { collections }
    }

    /// HTTP status of the first collection that has one.
    pub fn status(&self) -> Option<u16> {
        self.collections.iter().find_map(|c| c.status)
    }
}

impl From<ErrorCollection> for RemoteError {
    fn from(collection: ErrorCollection) -> Self {
        Self::new(vec![collection])
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REST error:")?;
        if self.collections.is_empty() {
            return write!(f, " (no details reported)");
        }
        for collection in &self.collections {
            write!(f, " {}", collection)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

/// Coarse classification of a [`JiraError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote service rejected the request or could not be reached
    Remote,
    /// A named entity does not exist
    NotFound,
    /// Caller input is malformed or not in the valid set
    InvalidArgument,
    /// Local file system failure
    Io,
}

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum JiraError {
    #[error("{0}")]
    Remote(#[from] RemoteError),

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("unexpected response from {url}: {message}")]
    UnexpectedResponse { url: String, message: String },

    #[error("project {key} not found")]
    ProjectNotFound { key: String },

    #[error(
        "transition '{target}' not found for {issue_key} (current status: {status}). \
         Check whether your JIRA account has the required permissions and whether \
         '{target}' is reachable from '{status}'."
    )]
    TransitionNotFound {
        issue_key: String,
        status: String,
        target: String,
    },

    #[error("invalid issue type: {name}. valid types are: [{}]", .valid.join(", "))]
    IssueTypeNotFound { name: String, valid: Vec<String> },

    #[error("invalid component: {name}. valid values are: [{}]", .valid.join(", "))]
    ComponentNotFound { name: String, valid: Vec<String> },

    #[error("link type: {name} is not present in list of issue links: [{}]", .valid.join(", "))]
    InvalidLinkType { name: String, valid: Vec<String> },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JiraError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JiraError::Remote(_)
            | JiraError::Transport { .. }
            | JiraError::UnexpectedResponse { .. } => ErrorKind::Remote,
            JiraError::ProjectNotFound { .. }
            | JiraError::TransitionNotFound { .. }
            | JiraError::IssueTypeNotFound { .. }
            | JiraError::ComponentNotFound { .. } => ErrorKind::NotFound,
            JiraError::InvalidLinkType { .. } => ErrorKind::InvalidArgument,
            JiraError::Io { .. } => ErrorKind::Io,
        }
    }

    /// True for failures reported by, or on the way to, the remote service.
    pub fn is_remote(&self) -> bool {
        self.kind() == ErrorKind::Remote
    }

    /// Shorthand for a remote error with a single collection.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        JiraError::Remote(ErrorCollection::new(status, message).into())
    }
}

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use jiracmd::errors::ActionableError;
///
/// let error = ActionableError::new("Configuration file jira.toml not found")
///     .with_cause("The command was run outside the directory holding jira.toml")
///     .with_remedy("Pass the file explicitly: jiracmd --config path/to/jira.toml ...");
///
/// eprintln!("{}", error);
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// Convert to a formatted multi-line message.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("{}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

const CONFIG_EXAMPLE: &str =
    "url = \"https://example.atlassian.net\", username = \"...\", password = \"...\", project = \"KEY\"";

/// Configuration file could not be found or read.
pub fn config_unreadable(path: &str, reason: &str) -> ActionableError {
    ActionableError::new(format!("Cannot read configuration file {}: {}", path, reason))
        .with_cause("The command was run outside the directory holding the configuration")
        .with_cause("JIRACMD_CONFIG points at a missing file")
        .with_remedy(format!("Create {} containing: {}", path, CONFIG_EXAMPLE))
        .with_remedy("Pass the file explicitly: jiracmd --config <path> ...")
}

/// Configuration file lacks required keys.
pub fn config_incomplete(path: &str, missing: &[&str]) -> ActionableError {
    ActionableError::new(format!(
        "Configuration file {} is missing required keys: {}",
        path,
        missing.join(", ")
    ))
    .with_cause("The file predates a required setting or a key is misspelled")
    .with_remedy(format!("Add the missing keys, e.g.: {}", CONFIG_EXAMPLE))
}
