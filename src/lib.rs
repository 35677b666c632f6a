//! # Preflight - Pre-release validation pipeline for Rust crates
//!
//! Preflight verifies that a crate is ready to ship: every example program
//! runs, the test suite passes under every configured combination of
//! optional features, static analysis is clean with warnings denied, the
//! documentation builds, the minimum supported toolchain still compiles the
//! crate, and a publish dry run succeeds.
//!
//! The interesting part is the orchestration, not the checks themselves:
//! preflight discovers a dynamic set of validation targets, expands them
//! into one ordered task queue, runs each task as an external process
//! through a narrow execution seam, applies blocking-vs-advisory fail-fast
//! policy per task, and aggregates a single pass/fail verdict with enough
//! detail to localize the failing task.
//!
//! ## Quick Start
//!
//! ```bash
//! # Validate the crate in the current directory
//! preflight
//!
//! # See what would run without running it
//! preflight plan
//!
//! # Skip the expensive trailing stages
//! preflight run --skip docs --skip publish
//! ```
//!
//! Policy lives in `preflight.yaml`: the optional-feature vocabulary, the
//! combinations to test under, the example denylist, per-task timeouts and
//! advisory strictness.
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cli;
pub mod discovery;
pub mod executor;
pub mod infrastructure;
pub mod pipeline;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use discovery::{ExampleTarget, FeatureSet, discover_examples, discover_feature_sets};
pub use executor::{LocalRunner, ProcessOutput, ProcessRunner, RunRequest, execute_task};
pub use infrastructure::{Config, ExtraTask, init_logging};
pub use pipeline::{
    ConfigError, DiscoveryError, ExecutionError, ExpansionError, PipelineController,
    PipelineState, PreflightError, Report, Stage, Task, TaskClass, TaskOutcome, TaskStatus,
    expand, static_tasks,
};

/// Version of the preflight crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
