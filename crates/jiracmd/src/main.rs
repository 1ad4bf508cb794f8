//! jiracmd
//!
//! Command-line client for bulk operations against a JIRA server: bulk
//! workflow transitions over a saved filter or JQL query, issue creation,
//! idempotent issue linking and attachment upload.

use anyhow::{Context, Result};
use clap::Parser;
use jiracmd::cli::{Cli, Commands};
use jiracmd::commands::{BulkTransitionReport, CommandExecutor};
use jiracmd::config::JiraConfig;
use jiracmd::domain::QuerySpec;
use jiracmd::output::{format_issue_details, format_issue_table, ExitCode, OutputContext};
use jiracmd::remote::HttpIssueService;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures
            let code = if e.use_stderr() {
                ExitCode::Failure
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            std::process::exit(code.code());
        }
    };

    init_logging(cli.verbose);

    let command_name = cli.command.name();
    let json = cli.command.wants_json();
    let output_ctx = OutputContext::new(cli.quiet, json);

    let outcome = run(cli, &output_ctx);
    if output_ctx.stdout_closed() {
        tracing::debug!("stdout closed by its reader; remaining output dropped");
    }
    if let Err(e) = outcome {
        output_ctx.report_failure(&e, command_name);
        std::process::exit(ExitCode::Failure.code());
    }
}

/// Diagnostics go to stderr. RUST_LOG wins over the verbosity flag.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("jiracmd={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli, output_ctx: &OutputContext) -> Result<()> {
    let config_path = JiraConfig::resolve_path(cli.config.as_deref());
    let config = JiraConfig::load(&config_path)?;
    tracing::debug!(?config, path = %config_path.display(), "configuration loaded");

    let service = HttpIssueService::new(&config);
    let command_name = cli.command.name();

    let project = match &cli.command {
        Commands::Bulk { project, .. } | Commands::Find { project, .. } => project.clone(),
        Commands::Create { project, .. }
        | Commands::Link { project, .. }
        | Commands::Attach { project, .. } => {
            project.clone().unwrap_or_else(|| config.project.clone())
        }
        Commands::Show { .. } | Commands::Projects { .. } => config.project.clone(),
    };
    let executor = CommandExecutor::connect(service, &project)
        .with_context(|| format!("failed to load metadata for project {}", project))?;

    match cli.command {
        Commands::Bulk { spec, state, .. } => {
            let spec = QuerySpec::parse(&spec);
            output_ctx.print_status(format!(
                "Transitioning issues from {} to '{}'",
                spec, state
            ))?;

            let report = executor.bulk_transition(&spec, &state, |issue| {
                let _ = output_ctx.print_status(format!(
                    "{}: {} > {}",
                    issue.key, issue.status.name, state
                ));
            })?;

            print_truncation(output_ctx, &report)?;
            output_ctx.print_json(&report, command_name)?;
            output_ctx.print_status(format!(
                "Transitioned {} issue(s) to '{}'",
                report.transitioned.len(),
                report.target_state
            ))?;
        }
        Commands::Find { spec, .. } => {
            let set = executor.resolve_issues(&QuerySpec::parse(&spec))?;
            if set.is_truncated() {
                output_ctx.print_warning(format!(
                    "showing {} of {} matching issues",
                    set.len(),
                    set.total
                ))?;
            }
            output_ctx.print_json(&set, command_name)?;
            output_ctx.print_data(format_issue_table(&set.issues).trim_end())?;
        }
        Commands::Show { key, .. } => {
            let issue = executor.show_issue(&key)?;
            output_ctx.print_json(&issue, command_name)?;
            output_ctx.print_data(format_issue_details(&issue).trim_end())?;
        }
        Commands::Projects { .. } => {
            let projects = executor.list_projects()?;
            output_ctx.print_json(&projects, command_name)?;
            for project in &projects {
                output_ctx.print_data(format!("{}\t\t{}", project.key, project.name))?;
            }
        }
        Commands::Create {
            issue_type,
            component,
            summary,
            description,
            ..
        } => {
            let key = executor.create_issue(&issue_type, &component, &summary, &description)?;
            output_ctx.print_json(json!({ "key": key }), command_name)?;
            if output_ctx.is_quiet() {
                output_ctx.print_data(&key)?;
            } else {
                output_ctx.print_data(format!("Created issue: {}", key))?;
            }
        }
        Commands::Link {
            source,
            target,
            link_type,
            ..
        } => {
            let outcome = executor.link_issues(&source, &target, &link_type)?;
            output_ctx.print_json(
                json!({ "source": source, "target": target, "outcome": outcome }),
                command_name,
            )?;
            output_ctx.print_status(match outcome {
                jiracmd::LinkOutcome::Created => format!("Linked {} to {}", source, target),
                jiracmd::LinkOutcome::AlreadyLinked => {
                    format!("{} already links to {}; nothing to do", source, target)
                }
            })?;
        }
        Commands::Attach { key, file, .. } => {
            executor.attach_file(&key, &file)?;
            output_ctx.print_status(format!("Attached {} to {}", file.display(), key))?;
        }
    }

    Ok(())
}

fn print_truncation(output_ctx: &OutputContext, report: &BulkTransitionReport) -> Result<()> {
    if report.truncated {
        output_ctx.print_warning(format!(
            "only {} of {} matching issues were returned and transitioned",
            report.transitioned.len(),
            report.total_matched
        ))?;
    }
    Ok(())
}
