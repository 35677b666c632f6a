//! Task execution: the process seam and its local implementation

pub mod local;
pub mod traits;

#[cfg(test)]
pub mod fake;

pub use local::LocalRunner;
pub use traits::{ProcessOutput, ProcessRunner, RunRequest, execute_task};
