//! `preflight run` - Execute the validation pipeline
//!
//! Loads configuration, discovers targets, expands the task queue, drives
//! it through the local process runner and renders the final report. The
//! process exit code encodes the verdict: 0 when everything passed, 1 when
//! a validation task failed, 2 when the pipeline could not start.

use super::{EXIT_VALIDATION_FAILED, FormatArg, StageArg, expanded_queue};
use crate::executor::LocalRunner;
use crate::infrastructure::Config;
use crate::pipeline::controller::PipelineController;
use crate::pipeline::expand::Stage;
use crate::pipeline::report::Report;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

/// Arguments for the run command
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Source root of the crate under validation
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Config file (default: <root>/preflight.yaml, falling back to defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip a pipeline stage (repeatable)
    #[arg(long, value_enum)]
    pub skip: Vec<StageArg>,

    /// Abort the queue on advisory failures instead of continuing
    #[arg(long)]
    pub strict_advisory: bool,

    /// Per-task timeout in seconds (overrides the configured value)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Report output format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Runs the pipeline and maps the verdict to an exit code
pub fn execute(args: &RunArgs) -> Result<ExitCode> {
    let root = resolve_root(args.root.as_deref());
    let config = Config::load(&root, args.config.as_deref())?;
    let skips: Vec<Stage> = args.skip.iter().copied().map(Stage::from).collect();

    tracing::info!(package = %config.package, root = %root.display(), "Starting validation");

    let tasks = expanded_queue(&root, &config, &skips)?;

    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .or_else(|| config.timeout());
    let strict = args.strict_advisory || config.strict_advisory;

    let controller = PipelineController::new(LocalRunner::new(), &root)
        .with_timeout(timeout)
        .with_strict_advisory(strict);
    let report = controller.run(tasks);

    match args.format.unwrap_or_default() {
        FormatArg::Text => render_text(&report),
        FormatArg::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{json}");
        }
    }

    Ok(if report.overall_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_VALIDATION_FAILED)
    })
}

/// Renders the human-readable report
fn render_text(report: &Report) {
    println!();
    for outcome in &report.outcomes {
        println!(
            "{:<12} {:<32} {:>7} ms",
            outcome.status.to_string(),
            outcome.task_id,
            outcome.duration_ms
        );
    }

    for failure in report.failures() {
        println!();
        println!(
            "---- {} ({}, exit code {}) ----",
            failure.task_id, failure.status, failure.exit_code
        );
        if !failure.stdout.is_empty() {
            println!("{}", failure.stdout.trim_end());
        }
        if !failure.stderr.is_empty() {
            println!("{}", failure.stderr.trim_end());
        }
    }

    println!();
    println!(
        "{}: {} passed, {} failed, {} skipped (of {})",
        report.state,
        report.passed_count(),
        report.failed_count(),
        report.skipped_count(),
        report.total_tasks
    );
    if let Some(first) = &report.first_failure {
        println!("First failure: {first}");
    }
    println!(
        "Verdict: {}",
        if report.overall_passed {
            "PASSED"
        } else {
            "FAILED"
        }
    );
}

/// Resolves the effective working directory for spawned tasks
///
/// Exposed for the plan command, which shares root resolution.
pub(crate) fn resolve_root(root: Option<&Path>) -> PathBuf {
    root.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::fake::{Script, ScriptedRunner};
    use crate::pipeline::task::{Task, TaskClass};

    fn report_from(runner: ScriptedRunner, tasks: Vec<Task>) -> Report {
        PipelineController::new(runner, ".").run(tasks)
    }

    #[test]
    fn test_resolve_root_default() {
        assert_eq!(resolve_root(None), PathBuf::from("."));
        assert_eq!(
            resolve_root(Some(Path::new("/work/lib"))),
            PathBuf::from("/work/lib")
        );
    }

    #[test]
    fn test_render_text_does_not_panic_on_failures() {
        let tasks = vec![
            Task::new("ok", vec!["ok".to_string()], TaskClass::Blocking, ""),
            Task::new("bad", vec!["bad".to_string()], TaskClass::Blocking, ""),
        ];
        let runner = ScriptedRunner::new().on("bad", Script::Exit(1));
        let report = report_from(runner, tasks);
        render_text(&report);
        assert!(!report.overall_passed);
    }
}
