//! `preflight plan` - Show the expanded task queue
//!
//! Performs discovery and expansion exactly as a run would, then prints
//! the ordered queue without executing anything. Useful for checking what
//! a configuration change does to the campaign before paying for it.

use super::{FormatArg, StageArg, expanded_queue, run::resolve_root};
use crate::infrastructure::Config;
use crate::pipeline::expand::Stage;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::ExitCode;

/// Arguments for the plan command
#[derive(clap::Args, Debug, Default)]
pub struct PlanArgs {
    /// Source root of the crate under validation
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Config file (default: <root>/preflight.yaml, falling back to defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip a pipeline stage (repeatable)
    #[arg(long, value_enum)]
    pub skip: Vec<StageArg>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Prints the expanded queue
pub fn execute(args: &PlanArgs) -> Result<ExitCode> {
    let root = resolve_root(args.root.as_deref());
    let config = Config::load(&root, args.config.as_deref())?;
    let skips: Vec<Stage> = args.skip.iter().copied().map(Stage::from).collect();

    let tasks = expanded_queue(&root, &config, &skips)?;

    match args.format.unwrap_or_default() {
        FormatArg::Text => {
            for (index, task) in tasks.iter().enumerate() {
                println!(
                    "{:>3}. [{}] {:<24} {}",
                    index + 1,
                    task.class,
                    task.id,
                    task.command_line()
                );
            }
            println!();
            println!("{} tasks", tasks.len());
        }
        FormatArg::Json => {
            let json = serde_json::to_string_pretty(&tasks).context("Failed to serialize plan")?;
            println!("{json}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
