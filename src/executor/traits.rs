//! Process execution interface
//!
//! The pipeline core talks to every external collaborator (build tool,
//! test runner, linter, doc generator, publisher) through this one narrow
//! seam. Anything satisfying [`ProcessRunner`] can be substituted, which is
//! how the controller tests run without spawning a single process.

use crate::pipeline::errors::ExecutionError;
use crate::pipeline::task::{Task, TaskOutcome, TaskStatus};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One process invocation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Command to execute; first element is the executable.
    pub command: Vec<String>,

    /// Environment entries added to the inherited environment.
    pub env: BTreeMap<String, String>,

    /// Working directory for the process.
    pub cwd: PathBuf,

    /// Maximum wall-clock duration before the process is killed.
    pub timeout: Option<Duration>,
}

/// Raw result of one finished (or killed) process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code (-1 when the process was killed or produced none).
    pub exit_code: i32,

    /// Captured standard output.
    pub stdout: Vec<u8>,

    /// Captured standard error.
    pub stderr: Vec<u8>,

    /// Wall-clock duration.
    pub duration: Duration,

    /// True when the process exceeded its timeout and was killed.
    pub timed_out: bool,
}

impl ProcessOutput {
    /// Returns true if the process ran to completion with exit code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// Trait for spawning one external process and waiting for it
///
/// A nonzero exit is a normal result, never an error. Implementations fail
/// only when the process cannot be started at all.
pub trait ProcessRunner {
    /// Runs one process to completion and captures its output
    fn run(&self, request: &RunRequest) -> Result<ProcessOutput, ExecutionError>;
}

/// Executes one task through a runner and classifies the result
///
/// Exactly one attempt is made; there are no retries. The error case means
/// the process never started and is escalated by the controller.
pub fn execute_task<R: ProcessRunner + ?Sized>(
    runner: &R,
    task: &Task,
    cwd: &Path,
    timeout: Option<Duration>,
) -> Result<TaskOutcome, ExecutionError> {
    let request = RunRequest {
        command: task.command.clone(),
        env: task.env.clone(),
        cwd: cwd.to_path_buf(),
        timeout,
    };

    tracing::debug!(task = %task.id, command = %task.command_line(), "Executing task");

    let output = runner.run(&request)?;

    let status = if output.timed_out {
        TaskStatus::TimedOut
    } else if output.exit_code == 0 {
        TaskStatus::Passed
    } else {
        TaskStatus::Failed
    };

    Ok(TaskOutcome::new(
        task,
        status,
        output.exit_code,
        &output.stdout,
        &output.stderr,
        output.duration,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_output_success() {
        let output = ProcessOutput {
            exit_code: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
            duration: Duration::from_millis(5),
            timed_out: false,
        };
        assert!(output.is_success());
    }

    #[test]
    fn test_process_output_timeout_is_not_success() {
        let output = ProcessOutput {
            exit_code: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
            duration: Duration::from_secs(30),
            timed_out: true,
        };
        assert!(!output.is_success());
    }
}
