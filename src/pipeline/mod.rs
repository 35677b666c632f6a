//! Validation pipeline domain: tasks, expansion, control flow and reporting

pub mod controller;
pub mod errors;
pub mod expand;
pub mod report;
pub mod task;

pub use controller::{PipelineController, PipelineState};
pub use errors::{
    ConfigError, DiscoveryError, ExecutionError, ExpansionError, PreflightError,
};
pub use expand::{Stage, expand, static_tasks};
pub use report::Report;
pub use task::{MAX_CAPTURED_OUTPUT, Task, TaskClass, TaskOutcome, TaskStatus};
