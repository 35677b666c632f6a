//! Core task types for the validation pipeline
//!
//! A [`Task`] is one externally executed validation step; a [`TaskOutcome`]
//! is the record of what happened when it ran. Tasks are created during
//! expansion and immutable afterwards; outcomes are owned by the report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Maximum bytes of captured stdout/stderr kept per task for reporting.
pub const MAX_CAPTURED_OUTPUT: usize = 64 * 1024;

/// Classification that decides the fail-fast policy for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskClass {
    /// Failure aborts all not-yet-started tasks
    Blocking,
    /// Failure is recorded but does not stop the queue
    Advisory,
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocking => write!(f, "blocking"),
            Self::Advisory => write!(f, "advisory"),
        }
    }
}

/// One unit of validation work
///
/// Invariant: `command` is non-empty; expansion rejects tasks that violate
/// this before the queue is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier, unique within one expanded queue.
    pub id: String,

    /// Command to execute; first element is the executable.
    pub command: Vec<String>,

    /// Fail-fast classification.
    pub class: TaskClass,

    /// Human-readable description for reports.
    pub description: String,

    /// Extra environment applied when the command is spawned.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Task {
    /// Creates a new task
    pub fn new(
        id: impl Into<String>,
        command: Vec<String>,
        class: TaskClass,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            command,
            class,
            description: description.into(),
            env: BTreeMap::new(),
        }
    }

    /// Adds environment entries applied when this task is spawned
    #[must_use]
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Renders the command as a single display string
    #[must_use]
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Terminal status of one executed task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Process ran and exited zero
    Passed,
    /// Process ran and exited nonzero
    Failed,
    /// Process exceeded its allotted duration and was killed
    TimedOut,
    /// Process could not be started at all
    SpawnFailed,
}

impl TaskStatus {
    /// Returns true if the task passed
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns true for any non-passed status
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.is_passed()
    }

    /// Returns true if this status aborts the queue even for advisory tasks
    ///
    /// Timeouts and spawn failures are escalated to blocking behavior: a
    /// check that never ran to completion cannot be assessed.
    #[must_use]
    pub fn escalates(&self) -> bool {
        matches!(self, Self::TimedOut | Self::SpawnFailed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
            Self::TimedOut => write!(f, "TIMED OUT"),
            Self::SpawnFailed => write!(f, "SPAWN FAILED"),
        }
    }
}

/// Record of one finished task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Id of the task this outcome belongs to.
    pub task_id: String,

    /// Classification the task was executed under.
    pub class: TaskClass,

    /// What happened.
    pub status: TaskStatus,

    /// Exit code of the process (-1 if it never produced one).
    pub exit_code: i32,

    /// Captured stdout, truncated to [`MAX_CAPTURED_OUTPUT`].
    pub stdout: String,

    /// Captured stderr, truncated to [`MAX_CAPTURED_OUTPUT`].
    pub stderr: String,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl TaskOutcome {
    /// Creates an outcome from raw captured process data
    pub fn new(
        task: &Task,
        status: TaskStatus,
        exit_code: i32,
        stdout: &[u8],
        stderr: &[u8],
        duration: Duration,
    ) -> Self {
        Self {
            task_id: task.id.clone(),
            class: task.class,
            status,
            exit_code,
            stdout: truncate_output(stdout),
            stderr: truncate_output(stderr),
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Returns true if the task passed
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status.is_passed()
    }
}

/// Converts captured bytes to a report string, truncating at the cap
fn truncate_output(bytes: &[u8]) -> String {
    if bytes.len() <= MAX_CAPTURED_OUTPUT {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let mut cut = MAX_CAPTURED_OUTPUT;
    // Do not cut inside a UTF-8 sequence: continuation bytes are 10xxxxxx
    while cut > 0 && (bytes[cut] & 0xC0) == 0x80 {
        cut -= 1;
    }
    let mut text = String::from_utf8_lossy(&bytes[..cut]).into_owned();
    text.push_str("\n... [output truncated]");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, class: TaskClass) -> Task {
        Task::new(id, vec!["true".to_string()], class, "test task")
    }

    #[test]
    fn test_task_class_display() {
        assert_eq!(TaskClass::Blocking.to_string(), "blocking");
        assert_eq!(TaskClass::Advisory.to_string(), "advisory");
    }

    #[test]
    fn test_task_command_line() {
        let t = Task::new(
            "lint",
            vec!["cargo".into(), "clippy".into(), "--all-targets".into()],
            TaskClass::Blocking,
            "lint",
        );
        assert_eq!(t.command_line(), "cargo clippy --all-targets");
    }

    #[test]
    fn test_status_predicates() {
        assert!(TaskStatus::Passed.is_passed());
        assert!(!TaskStatus::Passed.is_failure());
        assert!(TaskStatus::Failed.is_failure());
        assert!(!TaskStatus::Failed.escalates());
        assert!(TaskStatus::TimedOut.escalates());
        assert!(TaskStatus::SpawnFailed.escalates());
    }

    #[test]
    fn test_outcome_from_task() {
        let t = task("docs", TaskClass::Advisory);
        let outcome = TaskOutcome::new(
            &t,
            TaskStatus::Failed,
            101,
            b"building",
            b"error: broken link",
            Duration::from_millis(1500),
        );
        assert_eq!(outcome.task_id, "docs");
        assert_eq!(outcome.class, TaskClass::Advisory);
        assert_eq!(outcome.exit_code, 101);
        assert_eq!(outcome.duration_ms, 1500);
        assert!(!outcome.succeeded());
    }

    #[test]
    fn test_output_truncated_at_cap() {
        let big = vec![b'x'; MAX_CAPTURED_OUTPUT + 100];
        let text = truncate_output(&big);
        assert!(text.ends_with("[output truncated]"));
        assert!(text.len() < big.len());
    }

    #[test]
    fn test_output_untouched_below_cap() {
        assert_eq!(truncate_output(b"hello"), "hello");
    }

    #[test]
    fn test_truncation_respects_multibyte_boundary() {
        // Fill up to the cap, then place a multi-byte char straddling it
        let mut bytes = vec![b'a'; MAX_CAPTURED_OUTPUT - 1];
        bytes.extend_from_slice("é".as_bytes()); // 2 bytes, crosses the cap
        bytes.extend_from_slice(&[b'b'; 50]);
        let text = truncate_output(&bytes);
        assert!(!text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_task_serialize_roundtrip() {
        let t = task("test:none", TaskClass::Blocking);
        let json = serde_json::to_string(&t).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
