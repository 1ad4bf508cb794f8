//! Output formatting for CLI commands.
//!
//! Human output is plain text on stdout with warnings and errors on stderr.
//! With `--json` every command prints one envelope instead, so scripts can
//! consume results without scraping tables.

use chrono::Utc;
use serde::Serialize;
use std::cell::Cell;
use std::fmt::Display;
use std::io::{self, Write};

use crate::domain::Issue;
use crate::errors::{ErrorKind, JiraError};

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

/// Summaries longer than this are cut in the issue table.
pub const SUMMARY_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Where command output goes and how much of it.
///
/// A reader that closes stdout early (`jiracmd bulk ... | head -n2`) must
/// not cut a mutation short: once stdout reports a broken pipe, later
/// stdout lines are dropped and the command runs to its normal end, so the
/// exit code still reflects what happened on the server.
pub struct OutputContext {
    quiet: bool,
    json: bool,
    stdout_closed: Cell<bool>,
}

impl OutputContext {
    pub fn new(quiet: bool, json: bool) -> Self {
        Self {
            quiet,
            json,
            stdout_closed: Cell::new(false),
        }
    }

    /// Command results; shown unless --json
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        self.write_line(Stream::Stdout, &msg.to_string())
    }

    /// Progress and confirmation lines; suppressed by --quiet or --json
    pub fn print_status(&self, msg: impl Display) -> io::Result<()> {
        if self.quiet || self.json {
            return Ok(());
        }
        self.write_line(Stream::Stdout, &msg.to_string())
    }

    /// Suppressed by --quiet or --json
    pub fn print_warning(&self, msg: impl Display) -> io::Result<()> {
        if self.quiet || self.json {
            return Ok(());
        }
        self.write_line(Stream::Stderr, &format!("Warning: {}", msg))
    }

    /// Success envelope, only in --json mode
    pub fn print_json<T: Serialize>(&self, data: T, command: &str) -> io::Result<()> {
        if !self.json {
            return Ok(());
        }
        let rendered = JsonOutput::success(data, command)
            .to_json_string()
            .map_err(io::Error::other)?;
        self.write_line(Stream::Stdout, &rendered)
    }

    /// Report a failed command: an error envelope on stdout in --json mode,
    /// an `Error:` line on stderr otherwise.
    pub fn report_failure(&self, error: &anyhow::Error, command: &str) {
        if self.json {
            if let Ok(rendered) = JsonError::from_error(error, command).to_json_string() {
                let _ = self.write_line(Stream::Stdout, &rendered);
                return;
            }
        }
        let _ = self.write_line(Stream::Stderr, &format!("Error: {:#}", error));
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Whether stdout has been closed by its reader
    pub fn stdout_closed(&self) -> bool {
        self.stdout_closed.get()
    }

    fn write_line(&self, stream: Stream, line: &str) -> io::Result<()> {
        let written = match stream {
            Stream::Stdout if self.stdout_closed.get() => return Ok(()),
            Stream::Stdout => writeln!(io::stdout().lock(), "{}", line),
            Stream::Stderr => writeln!(io::stderr().lock(), "{}", line),
        };
        match written {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                if stream == Stream::Stdout {
                    self.stdout_closed.set(true);
                }
                Ok(())
            }
            other => other,
        }
    }
}

// ============================================================================
// Human-readable formatting
// ============================================================================

/// Cut `summary` to `width` characters, marking the cut with "...".
pub fn truncate_summary(summary: &str, width: usize) -> String {
    if summary.chars().count() <= width {
        summary.to_string()
    } else {
        let cut: String = summary.chars().take(width).collect();
        format!("{}...", cut)
    }
}

/// Render issues as the tab-separated key/summary/status table.
pub fn format_issue_table(issues: &[Issue]) -> String {
    let mut out = String::from("KEY\t\tSUMMARY\t\tSTATUS\n");
    for issue in issues {
        out.push_str(&format!(
            "{}\t\t{}\t\t{}\n",
            issue.key,
            truncate_summary(&issue.summary, SUMMARY_WIDTH),
            issue.status.name
        ));
    }
    out
}

/// Multi-line description of a single issue.
pub fn format_issue_details(issue: &Issue) -> String {
    let mut out = format!(
        "{}: {}\nStatus: {}\n",
        issue.key, issue.summary, issue.status.name
    );
    if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("\n{}\n", description));
    }
    if !issue.links.is_empty() {
        out.push_str("\nLinks:\n");
        for link in &issue.links {
            out.push_str(&format!(
                "  {} ({}, {:?})\n",
                link.target_key, link.link_type, link.direction
            ));
        }
    }
    out
}

// ============================================================================
// JSON Output Types
// ============================================================================

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "NOT_FOUND", "REMOTE_ERROR")
    pub code: String,
    pub message: String,
}

impl JsonError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
            metadata: Metadata::new(command),
        }
    }

    /// Build from any error, classifying library errors by kind.
    pub fn from_error(err: &anyhow::Error, command: impl Into<String>) -> Self {
        let code = err
            .downcast_ref::<JiraError>()
            .map(|e| ErrorCode::for_kind(e.kind()))
            .unwrap_or(ErrorCode::GENERIC);
        Self::new(code, format!("{:#}", err), command)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Standard error codes for JSON error output
pub struct ErrorCode;

impl ErrorCode {
    pub const REMOTE_ERROR: &'static str = "REMOTE_ERROR";
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const INVALID_ARGUMENT: &'static str = "INVALID_ARGUMENT";
    pub const IO_ERROR: &'static str = "IO_ERROR";
    pub const GENERIC: &'static str = "ERROR";

    pub fn for_kind(kind: ErrorKind) -> &'static str {
        match kind {
            ErrorKind::Remote => Self::REMOTE_ERROR,
            ErrorKind::NotFound => Self::NOT_FOUND,
            ErrorKind::InvalidArgument => Self::INVALID_ARGUMENT,
            ErrorKind::Io => Self::IO_ERROR,
        }
    }
}

/// Process exit codes. Every failure maps to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Metadata included in all JSON responses
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// ISO 8601 timestamp
    pub timestamp: String,
    /// Output format version
    pub version: String,
    /// Command that generated this output
    pub command: String,
}

impl Metadata {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}
