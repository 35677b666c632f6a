//! Pipeline controller
//!
//! Drives the expanded task queue through the executor, one task at a time
//! in expansion order, applying the two-tier fail-fast policy: a blocking
//! failure aborts every not-yet-started task, an advisory failure is
//! recorded and the queue keeps going. Timeouts and spawn failures are
//! escalated to blocking behavior regardless of the task's declared class.

use super::errors::ExecutionError;
use super::report::Report;
use super::task::{Task, TaskClass, TaskOutcome, TaskStatus};
use crate::executor::{ProcessRunner, execute_task};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Controller lifecycle states
///
/// `Idle → Running → {Completed, Aborted}`; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    /// Queue accepted, nothing executed yet
    Idle,
    /// Tasks are being executed
    Running,
    /// Queue ran to the end with no aborting failure
    Completed,
    /// A blocking (or escalated) failure stopped the queue
    Aborted,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Aborted => write!(f, "ABORTED"),
        }
    }
}

/// Sequential driver for one validation run
///
/// Owns the live queue and the in-progress report; consuming [`run`]
/// finalizes the report exactly once and hands it to the caller.
///
/// [`run`]: PipelineController::run
#[derive(Debug)]
pub struct PipelineController<R> {
    runner: R,
    cwd: PathBuf,
    timeout: Option<Duration>,
    strict_advisory: bool,
    state: PipelineState,
}

impl<R: ProcessRunner> PipelineController<R> {
    /// Creates a controller running tasks in the given working directory
    pub fn new(runner: R, cwd: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            cwd: cwd.into(),
            timeout: None,
            strict_advisory: false,
            state: PipelineState::Idle,
        }
    }

    /// Sets the per-task timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Escalates advisory failures to aborting behavior
    #[must_use]
    pub fn with_strict_advisory(mut self, strict: bool) -> Self {
        self.strict_advisory = strict;
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs the queue to completion or first aborting failure
    ///
    /// Every executed task is recorded in the report in queue order. Tasks
    /// after an abort are never started.
    pub fn run(mut self, tasks: Vec<Task>) -> Report {
        let run_id = Uuid::new_v4();
        let total = tasks.len();
        let mut outcomes = Vec::with_capacity(total);

        self.state = PipelineState::Running;
        tracing::info!(run_id = %run_id, tasks = total, "Pipeline started");

        for task in &tasks {
            let outcome = self.execute_one(task);
            let abort = self.aborts(task, &outcome);

            if outcome.succeeded() {
                tracing::info!(
                    task = %task.id,
                    duration_ms = outcome.duration_ms,
                    "Task passed"
                );
            } else {
                tracing::warn!(
                    task = %task.id,
                    class = %task.class,
                    status = %outcome.status,
                    exit_code = outcome.exit_code,
                    "Task failed"
                );
            }

            outcomes.push(outcome);

            if abort {
                self.state = PipelineState::Aborted;
                tracing::error!(
                    task = %task.id,
                    remaining = total - outcomes.len(),
                    "Aborting pipeline"
                );
                break;
            }
        }

        if self.state != PipelineState::Aborted {
            self.state = PipelineState::Completed;
        }

        let report = Report::finalize(run_id, total, outcomes, self.state);
        tracing::info!(
            run_id = %run_id,
            state = %report.state,
            passed = report.passed_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "Pipeline finished"
        );
        report
    }

    /// Executes one task, folding a spawn failure into its outcome
    fn execute_one(&self, task: &Task) -> TaskOutcome {
        match execute_task(&self.runner, task, &self.cwd, self.timeout) {
            Ok(outcome) => outcome,
            Err(ExecutionError::Spawn { reason, .. }) => TaskOutcome::new(
                task,
                TaskStatus::SpawnFailed,
                -1,
                b"",
                reason.as_bytes(),
                Duration::ZERO,
            ),
        }
    }

    /// Decides whether a finished task stops the queue
    fn aborts(&self, task: &Task, outcome: &TaskOutcome) -> bool {
        if outcome.succeeded() {
            return false;
        }
        task.class == TaskClass::Blocking || outcome.status.escalates() || self.strict_advisory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::fake::{Script, ScriptedRunner};
    use pretty_assertions::assert_eq;

    fn task(id: &str, class: TaskClass) -> Task {
        // One-word commands double as scripted-runner keys
        Task::new(id, vec![id.to_string()], class, format!("task {id}"))
    }

    /// The eight-task queue from a two-example, two-feature-set campaign
    fn campaign() -> Vec<Task> {
        vec![
            task("example1", TaskClass::Blocking),
            task("example2", TaskClass::Blocking),
            task("test-none", TaskClass::Blocking),
            task("test-tls", TaskClass::Blocking),
            task("lint", TaskClass::Blocking),
            task("docs", TaskClass::Advisory),
            task("msrv", TaskClass::Advisory),
            task("publish", TaskClass::Blocking),
        ]
    }

    fn run_with(runner: ScriptedRunner, tasks: Vec<Task>) -> (Report, Vec<String>) {
        let calls_handle = runner.clone();
        let report = PipelineController::new(runner, ".").run(tasks);
        (report, calls_handle.calls())
    }

    #[test]
    fn test_all_tasks_pass() {
        let (report, executed) = run_with(ScriptedRunner::new(), campaign());
        assert_eq!(report.state, PipelineState::Completed);
        assert!(report.overall_passed);
        assert_eq!(report.first_failure, None);
        assert_eq!(executed.len(), 8);
        assert_eq!(report.skipped_count(), 0);
    }

    #[test]
    fn test_blocking_failure_aborts_rest() {
        let runner = ScriptedRunner::new().on("test-tls", Script::Exit(1));
        let (report, executed) = run_with(runner, campaign());

        assert_eq!(report.state, PipelineState::Aborted);
        assert!(!report.overall_passed);
        assert_eq!(report.first_failure.as_deref(), Some("test-tls"));
        // lint, docs, msrv, publish never executed
        assert_eq!(
            executed,
            vec!["example1", "example2", "test-none", "test-tls"]
        );
        assert_eq!(report.skipped_count(), 4);
    }

    #[test]
    fn test_advisory_failure_does_not_abort() {
        let runner = ScriptedRunner::new().on("docs", Script::Exit(1));
        let (report, executed) = run_with(runner, campaign());

        assert_eq!(report.state, PipelineState::Completed);
        // Default strictness: the verdict fails but the queue ran to the end
        assert!(!report.overall_passed);
        assert_eq!(report.first_failure.as_deref(), Some("docs"));
        assert_eq!(executed.len(), 8);
    }

    #[test]
    fn test_strict_advisory_escalates_to_abort() {
        let runner = ScriptedRunner::new().on("docs", Script::Exit(1));
        let controller = PipelineController::new(runner, ".").with_strict_advisory(true);
        let report = controller.run(campaign());

        assert_eq!(report.state, PipelineState::Aborted);
        assert_eq!(report.outcomes.len(), 6);
        assert_eq!(report.first_failure.as_deref(), Some("docs"));
    }

    #[test]
    fn test_advisory_timeout_escalates_to_abort() {
        let runner = ScriptedRunner::new().on("msrv", Script::TimeOut);
        let (report, executed) = run_with(runner, campaign());

        assert_eq!(report.state, PipelineState::Aborted);
        let msrv = report.outcomes.last().unwrap();
        assert_eq!(msrv.status, TaskStatus::TimedOut);
        assert_eq!(executed.last().map(String::as_str), Some("msrv"));
        // publish never ran
        assert_eq!(report.skipped_count(), 1);
    }

    #[test]
    fn test_advisory_spawn_failure_escalates_to_abort() {
        let runner = ScriptedRunner::new().on("docs", Script::FailSpawn);
        let (report, _) = run_with(runner, campaign());

        assert_eq!(report.state, PipelineState::Aborted);
        let docs = report.outcomes.last().unwrap();
        assert_eq!(docs.status, TaskStatus::SpawnFailed);
        assert_eq!(docs.exit_code, -1);
        assert!(docs.stderr.contains("No such file"));
    }

    #[test]
    fn test_report_order_equals_queue_order() {
        let runner = ScriptedRunner::new().on("example2", Script::Exit(7));
        let (report, executed) = run_with(runner, campaign());
        assert_eq!(executed, vec!["example1", "example2"]);
        assert_eq!(report.outcomes[1].exit_code, 7);
    }

    #[test]
    fn test_empty_queue_completes_and_passes() {
        let (report, executed) = run_with(ScriptedRunner::new(), Vec::new());
        assert_eq!(report.state, PipelineState::Completed);
        assert!(report.overall_passed);
        assert!(executed.is_empty());
    }

    #[test]
    fn test_state_starts_idle() {
        let controller = PipelineController::new(ScriptedRunner::new(), ".");
        assert_eq!(controller.state(), PipelineState::Idle);
    }

    #[test]
    fn test_end_to_end_with_local_runner() {
        use crate::executor::LocalRunner;

        let sh = |id: &str, script: &str, class: TaskClass| {
            Task::new(
                id,
                vec!["sh".to_string(), "-c".to_string(), script.to_string()],
                class,
                format!("task {id}"),
            )
        };
        let tasks = vec![
            sh("examples", "echo examples ok", TaskClass::Blocking),
            sh("docs", "echo doc warning >&2; exit 1", TaskClass::Advisory),
            sh("publish", "echo publish ok", TaskClass::Blocking),
        ];

        let report = PipelineController::new(LocalRunner::new(), ".").run(tasks);

        assert_eq!(report.state, PipelineState::Completed);
        assert!(!report.overall_passed);
        assert_eq!(report.first_failure.as_deref(), Some("docs"));
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcomes[0].stdout.contains("examples ok"));
        assert!(report.outcomes[1].stderr.contains("doc warning"));
    }

    #[test]
    fn test_end_to_end_timeout_aborts() {
        use crate::executor::LocalRunner;

        let tasks = vec![
            Task::new(
                "slow",
                vec!["sh".to_string(), "-c".to_string(), "sleep 30".to_string()],
                TaskClass::Advisory,
                "slow advisory task",
            ),
            Task::new(
                "after",
                vec!["sh".to_string(), "-c".to_string(), "true".to_string()],
                TaskClass::Blocking,
                "never reached",
            ),
        ];

        let controller = PipelineController::new(LocalRunner::new(), ".")
            .with_timeout(Some(Duration::from_millis(200)));
        let report = controller.run(tasks);

        assert_eq!(report.state, PipelineState::Aborted);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].status, TaskStatus::TimedOut);
        assert_eq!(report.first_failure.as_deref(), Some("slow"));
    }
}
