//! Local process runner
//!
//! Spawns each task directly on the host, captures stdout and stderr on
//! reader threads, and enforces the optional per-task timeout by killing
//! the child once the deadline passes so no process outlives the pipeline.

use super::traits::{ProcessOutput, ProcessRunner, RunRequest};
use crate::pipeline::errors::ExecutionError;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Poll interval while waiting on a child with a deadline.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runner that executes commands as local child processes
#[derive(Debug, Clone, Default)]
pub struct LocalRunner;

impl LocalRunner {
    /// Creates a new local runner
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for LocalRunner {
    fn run(&self, request: &RunRequest) -> Result<ProcessOutput, ExecutionError> {
        let command_line = request.command.join(" ");
        let spawn_error = |reason: String| ExecutionError::Spawn {
            command: command_line.clone(),
            reason,
        };

        let Some((program, args)) = request.command.split_first() else {
            return Err(spawn_error("empty command".to_string()));
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&request.cwd)
            .envs(&request.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| spawn_error(e.to_string()))?;

        let stdout_thread = drain(child.stdout.take());
        let stderr_thread = drain(child.stderr.take());

        let (status, timed_out) = wait_with_deadline(&mut child, start, request.timeout)
            .map_err(|e| spawn_error(format!("wait failed: {e}")))?;

        let stdout = stdout_thread.join().unwrap_or_default();
        let stderr = stderr_thread.join().unwrap_or_default();
        let duration = start.elapsed();

        let exit_code = status.and_then(|s| s.code()).unwrap_or(-1);

        tracing::debug!(
            command = %command_line,
            exit_code,
            timed_out,
            duration_ms = duration.as_millis(),
            "Process finished"
        );

        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr,
            duration,
            timed_out,
        })
    }
}

/// Reads a captured pipe to the end on a dedicated thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Waits for the child, killing it once the deadline passes
///
/// Returns the exit status (None when killed) and whether the timeout hit.
fn wait_with_deadline(
    child: &mut Child,
    start: Instant,
    timeout: Option<Duration>,
) -> std::io::Result<(Option<ExitStatus>, bool)> {
    let Some(limit) = timeout else {
        return Ok((Some(child.wait()?), false));
    };

    let deadline = start + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((Some(status), false));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            // Reap so the killed child does not linger as a zombie
            let status = child.wait().ok();
            return Ok((status, true));
        }
        thread::sleep(WAIT_POLL_INTERVAL);
    }
}
