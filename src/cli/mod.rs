//! CLI for preflight
//!
//! - `run`: execute the full validation pipeline (the default command)
//! - `plan`: print the expanded task queue without executing anything
//! - `completions`: generate shell completions

pub mod completions;
pub mod plan;
pub mod run;

use crate::discovery::{discover_examples, discover_feature_sets};
use crate::infrastructure::Config;
use crate::pipeline::errors::PreflightError;
use crate::pipeline::expand::{Stage, expand, static_tasks};
use crate::pipeline::task::Task;
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit code when at least one validation task failed.
pub const EXIT_VALIDATION_FAILED: u8 = 1;

/// Exit code when the pipeline could not start (config, discovery or
/// expansion error).
pub const EXIT_SETUP_FAILED: u8 = 2;

/// CLI arguments for preflight
#[derive(Parser, Debug)]
#[command(name = "preflight")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the validation pipeline
    Run(run::RunArgs),

    /// Show the expanded task queue without executing it
    Plan(plan::PlanArgs),

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Pipeline stages addressable from the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    /// Discovered example programs
    Examples,
    /// Test suite runs per feature set
    Features,
    /// Static analysis
    Lint,
    /// Documentation build
    Docs,
    /// Minimum supported toolchain check
    Msrv,
    /// Publish dry run
    Publish,
}

impl From<StageArg> for Stage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Examples => Stage::Examples,
            StageArg::Features => Stage::Features,
            StageArg::Lint => Stage::Lint,
            StageArg::Docs => Stage::Docs,
            StageArg::Msrv => Stage::Msrv,
            StageArg::Publish => Stage::Publish,
        }
    }
}

/// Report output formats
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Human-readable summary
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Builds the clap command, used for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Parse and execute CLI arguments
pub fn run() -> Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        None => run::execute(&run::RunArgs::default()),
        Some(Command::Run(run_args)) => run::execute(&run_args),
        Some(Command::Plan(plan_args)) => plan::execute(&plan_args),
        Some(Command::Completions { shell, output }) => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let completions = completions::generate_completions(shell_enum)?;

            if let Some(output_path) = output {
                completions::save_completions(&completions, &output_path)?;
            } else {
                println!("{completions}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Discovers targets and expands the full task queue for one invocation
pub(crate) fn expanded_queue(
    root: &Path,
    config: &Config,
    skips: &[Stage],
) -> Result<Vec<Task>, PreflightError> {
    let examples = if skips.contains(&Stage::Examples) {
        Vec::new()
    } else {
        discover_examples(root, &config.example_denylist)?
    };

    let feature_sets = if skips.contains(&Stage::Features) {
        Vec::new()
    } else {
        discover_feature_sets(&config.flags, &config.feature_sets, &config.conflicts)?
    };

    let statics = static_tasks(config, skips)?;
    Ok(expand(&examples, &feature_sets, statics, config)?)
}
