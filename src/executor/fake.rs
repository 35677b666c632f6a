//! Scripted process runner for controller tests
//!
//! Resolves each command against a scripted table instead of spawning
//! anything, and records the order commands were issued in so tests can
//! assert exactly which tasks ran.

use super::traits::{ProcessOutput, ProcessRunner, RunRequest};
use crate::pipeline::errors::ExecutionError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted behavior for one command
#[derive(Debug, Clone)]
pub enum Script {
    /// Finish with this exit code
    Exit(i32),
    /// Exceed the timeout and get killed
    TimeOut,
    /// Fail to start at all
    FailSpawn,
}

/// Runner that replays scripted outcomes; unscripted commands pass
///
/// Clones share the call log, so a test can keep a handle after moving
/// the runner into the controller.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    scripts: HashMap<String, Script>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRunner {
    /// Creates a runner where every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the outcome for one command line
    pub fn on(mut self, command_line: &str, script: Script) -> Self {
        self.scripts.insert(command_line.to_string(), script);
        self
    }

    /// Command lines issued so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, request: &RunRequest) -> Result<ProcessOutput, ExecutionError> {
        let key = request.command.join(" ");
        self.calls.lock().unwrap().push(key.clone());

        let script = self.scripts.get(&key).cloned().unwrap_or(Script::Exit(0));
        match script {
            Script::Exit(code) => Ok(ProcessOutput {
                exit_code: code,
                stdout: format!("stdout of {key}").into_bytes(),
                stderr: if code == 0 {
                    Vec::new()
                } else {
                    format!("{key} failed").into_bytes()
                },
                duration: Duration::from_millis(10),
                timed_out: false,
            }),
            Script::TimeOut => Ok(ProcessOutput {
                exit_code: -1,
                stdout: Vec::new(),
                stderr: Vec::new(),
                duration: request.timeout.unwrap_or(Duration::from_secs(1)),
                timed_out: true,
            }),
            Script::FailSpawn => Err(ExecutionError::Spawn {
                command: key,
                reason: "No such file or directory".to_string(),
            }),
        }
    }
}
