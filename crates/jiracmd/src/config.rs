//! Configuration file loading and parsing.
//!
//! Connection settings live in a TOML file, `jira.toml` in the current
//! directory unless `--config` or `JIRACMD_CONFIG` names another path:
//!
//! ```toml
//! url = "https://example.atlassian.net"
//! username = "alice"
//! password = "api-token"
//! project = "TEST"
//! timeout_secs = 30    # optional
//! ```
//!
//! Every key except `timeout_secs` is required; a missing one is fatal.

use crate::errors::{config_incomplete, config_unreadable};
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "jira.toml";

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV_VAR: &str = "JIRACMD_CONFIG";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw file contents; every field optional so missing keys can be reported together.
#[derive(Debug, Default, Deserialize)]
struct ConfigToml {
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    project: Option<String>,
    timeout_secs: Option<u64>,
}

/// Validated connection settings for one session.
#[derive(Clone, PartialEq, Eq)]
pub struct JiraConfig {
    /// Base URL of the JIRA instance, without trailing slash
    pub url: String,
    pub username: String,
    pub password: String,
    /// Default project key
    pub project: String,
    /// Per-request timeout for the HTTP transport
    pub timeout: Duration,
}

// Hand-written so the password never reaches logs.
impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("project", &self.project)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl JiraConfig {
    /// Resolve the configuration path: explicit flag, then environment, then default.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }

    /// Load and validate configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_unreadable(&display, &e.to_string()))?;
        Self::parse(&content, &display)
    }

    /// Parse and validate TOML content. `origin` names the source in error messages.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let raw: ConfigToml =
            toml::from_str(content).map_err(|e| config_unreadable(origin, &e.to_string()))?;

        let url = non_blank(raw.url).map(|v| v.trim().to_string());
        let username = non_blank(raw.username);
        let password = non_blank(raw.password);
        let project = non_blank(raw.project).map(|v| v.trim().to_string());

        let missing: Vec<&str> = [
            ("url", url.is_none()),
            ("username", username.is_none()),
            ("password", password.is_none()),
            ("project", project.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        match (url, username, password, project) {
            (Some(url), Some(username), Some(password), Some(project)) => Ok(Self {
                url: url.trim_end_matches('/').to_string(),
                username,
                password,
                project,
                timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            }),
            _ => Err(config_incomplete(origin, &missing).into()),
        }
    }
}

/// Drops whitespace-only values; kept values are returned as written.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FULL: &str = r#"
url = "https://jira.example.com/"
username = "alice"
password = "secret"
project = "TEST"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = JiraConfig::parse(FULL, "jira.toml").unwrap();
        assert_eq!(config.url, "https://jira.example.com");
        assert_eq!(config.username, "alice");
        assert_eq!(config.password, "secret");
        assert_eq!(config.project, "TEST");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_parse_custom_timeout() {
        let content = format!("{}\ntimeout_secs = 5\n", FULL);
        let config = JiraConfig::parse(&content, "jira.toml").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_password_keeps_surrounding_spaces() {
        let content = FULL.replace("\"secret\"", "\" s3cret \"");
        let config = JiraConfig::parse(&content, "jira.toml").unwrap();
        assert_eq!(config.password, " s3cret ");

        let blank = FULL.replace("\"secret\"", "\"   \"");
        let err = JiraConfig::parse(&blank, "jira.toml").unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_missing_keys_are_all_reported() {
        let err = JiraConfig::parse("url = \"https://x\"\npassword = \"  \"\n", "jira.toml")
            .unwrap_err()
            .to_string();
        assert!(err.contains("missing required keys: username, password, project"));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = JiraConfig::parse("url = ", "broken.toml")
            .unwrap_err()
            .to_string();
        assert!(err.contains("broken.toml"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jira.toml");
        let err = JiraConfig::load(&path).unwrap_err().to_string();
        assert!(err.contains("Cannot read configuration file"));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jira.toml");
        fs::write(&path, FULL).unwrap();

        let config = JiraConfig::load(&path).unwrap();
        assert_eq!(config.project, "TEST");
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = Path::new("/tmp/other.toml");
        assert_eq!(JiraConfig::resolve_path(Some(explicit)), explicit);
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = JiraConfig::parse(FULL, "jira.toml").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
