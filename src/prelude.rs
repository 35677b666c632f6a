//! Prelude module for common imports

// Re-export all pipeline types with full paths
pub use crate::pipeline::controller::{PipelineController, PipelineState};
pub use crate::pipeline::errors::{
    ConfigError, DiscoveryError, ExecutionError, ExpansionError, PreflightError,
};
pub use crate::pipeline::expand::{Stage, expand, static_tasks};
pub use crate::pipeline::report::Report;
pub use crate::pipeline::task::{Task, TaskClass, TaskOutcome, TaskStatus};

// Re-export discovery types
pub use crate::discovery::{ExampleTarget, FeatureSet, discover_examples, discover_feature_sets};

// Re-export executor types
pub use crate::executor::{LocalRunner, ProcessOutput, ProcessRunner, RunRequest, execute_task};

// Re-export configuration types
pub use crate::infrastructure::{Config, ExtraTask};
