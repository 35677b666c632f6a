//! Task expansion
//!
//! Turns discovered targets plus the static trailing checks into one
//! ordered task queue. The order is fixed and significant: cheap, narrow
//! checks (examples, per-feature-set test runs) come before expensive,
//! global ones (lint, docs, toolchain check, publish dry run) so failures
//! surface early and cheaply.
//!
//! Expansion is a pure function of its inputs: identical inputs yield an
//! identical queue with byte-identical task ids.

use super::errors::ExpansionError;
use super::task::{Task, TaskClass};
use crate::discovery::{ExampleTarget, FeatureSet};
use crate::infrastructure::config::{Config, expand_variables};
use std::collections::HashSet;

/// Pipeline stages that can be selected or skipped from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Run every discovered example
    Examples,
    /// Run the test suite under each configured feature set
    Features,
    /// Static analysis with warnings denied
    Lint,
    /// Documentation build
    Docs,
    /// Minimum supported toolchain check
    Msrv,
    /// Publish dry run
    Publish,
}

/// Builds the static trailing tasks in their declared order
///
/// Lint (blocking), docs (advisory), msrv (advisory), configured extra
/// tasks, then the publish dry run (blocking) last. Stages on the skip
/// list are omitted; extra tasks are parsed from their configured command
/// strings with shell quoting rules and `${VAR}` expansion.
pub fn static_tasks(config: &Config, skips: &[Stage]) -> Result<Vec<Task>, ExpansionError> {
    let skipped = |stage: Stage| skips.contains(&stage);
    let mut tasks = Vec::new();

    if !skipped(Stage::Lint) {
        tasks.push(
            Task::new(
                "lint",
                cargo(&["clippy", "--all-targets", "--all-features", "--", "-D", "warnings"]),
                TaskClass::Blocking,
                "static analysis with warnings denied",
            )
            .with_env(config.env.clone()),
        );
    }

    if !skipped(Stage::Docs) {
        let mut env = config.env.clone();
        env.entry("RUSTDOCFLAGS".to_string())
            .or_insert_with(|| "-D warnings".to_string());
        tasks.push(
            Task::new(
                "docs",
                cargo(&["doc", "--no-deps", "--all-features"]),
                TaskClass::Advisory,
                "documentation build",
            )
            .with_env(env),
        );
    }

    if !skipped(Stage::Msrv) {
        tasks.push(
            Task::new(
                "msrv",
                cargo(&["msrv", "verify"]),
                TaskClass::Advisory,
                "minimum supported toolchain check",
            )
            .with_env(config.env.clone()),
        );
    }

    for extra in &config.extra_tasks {
        let expanded = expand_variables(&extra.command, &config.env);
        let command = shell_words::split(&expanded).map_err(|e| ExpansionError::MalformedCommand {
            id: extra.id.clone(),
            reason: e.to_string(),
        })?;
        tasks.push(
            Task::new(&extra.id, command, extra.class, &extra.description)
                .with_env(config.env.clone()),
        );
    }

    if !skipped(Stage::Publish) {
        tasks.push(
            Task::new(
                "publish",
                cargo(&["publish", "--dry-run"]),
                TaskClass::Blocking,
                "publish dry run",
            )
            .with_env(config.env.clone()),
        );
    }

    Ok(tasks)
}

/// Expands targets and static tasks into the ordered task queue
///
/// Order: one blocking task per example (run with all features enabled so
/// examples exercise the maximal feature surface), one blocking task per
/// feature set (the full test suite under exactly that combination), then
/// the static tasks in declared order. Rejects duplicate ids and empty
/// commands before anything runs.
pub fn expand(
    examples: &[ExampleTarget],
    feature_sets: &[FeatureSet],
    static_tasks: Vec<Task>,
    config: &Config,
) -> Result<Vec<Task>, ExpansionError> {
    let mut tasks = Vec::with_capacity(examples.len() + feature_sets.len() + static_tasks.len());

    for example in examples {
        tasks.push(
            Task::new(
                format!("example:{}", example.name),
                cargo(&["run", "--example", &example.name, "--all-features"]),
                TaskClass::Blocking,
                format!("run example '{}' with all features", example.name),
            )
            .with_env(config.env.clone()),
        );
    }

    for set in feature_sets {
        let mut command = cargo(&["test", "--no-default-features"]);
        if !set.is_empty() {
            command.push("--features".to_string());
            command.push(set.cargo_features());
        }
        tasks.push(
            Task::new(
                format!("test:{}", set.name),
                command,
                TaskClass::Blocking,
                format!("test suite under feature set '{}'", set.name),
            )
            .with_env(config.env.clone()),
        );
    }

    tasks.extend(static_tasks);

    let mut seen = HashSet::new();
    for task in &tasks {
        if task.command.is_empty() {
            return Err(ExpansionError::EmptyCommand {
                id: task.id.clone(),
            });
        }
        if !seen.insert(task.id.as_str()) {
            return Err(ExpansionError::DuplicateTask {
                id: task.id.clone(),
            });
        }
    }

    tracing::info!(
        examples = examples.len(),
        feature_sets = feature_sets.len(),
        total = tasks.len(),
        "Expanded task queue"
    );
    Ok(tasks)
}

fn cargo(args: &[&str]) -> Vec<String> {
    std::iter::once("cargo")
        .chain(args.iter().copied())
        .map(String::from)
        .collect()
}
