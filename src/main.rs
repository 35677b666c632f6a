//! preflight - Pre-release validation pipeline for Rust crates
//!
//! A command-line tool that runs a crate's whole release checklist as one
//! ordered pipeline: example programs, the test suite under each configured
//! feature combination, static analysis with warnings denied, the
//! documentation build, the minimum supported toolchain check and a publish
//! dry run.
//!
//! ## Commands
//!
//! - `preflight run` - Execute the validation pipeline (default)
//! - `preflight plan` - Show the expanded task queue without executing it
//! - `preflight completions` - Generate shell completions
//!
//! ## Exit codes
//!
//! - `0` - every task passed
//! - `1` - at least one validation task failed
//! - `2` - the pipeline could not start (config, discovery or expansion)
//!
//! ## Quick Start
//!
//! ```bash
//! # Full validation of the crate in the current directory
//! preflight
//!
//! # Validate another tree, without the publish dry run
//! preflight run --root ../mylib --skip publish
//! ```

use preflight::cli;
use preflight::infrastructure::init_logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    // PREFLIGHT_LOG overrides the default level
    init_logging("info");

    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if std::env::var("PREFLIGHT_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::from(cli::EXIT_SETUP_FAILED)
        }
    }
}
