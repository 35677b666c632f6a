//! Error types for the validation pipeline domain

use thiserror::Error;

/// Top-level error for a validation run
///
/// Discovery, expansion and configuration errors are fatal and abort the
/// run before any task executes. A nonzero exit from a started task is
/// never an error; it is recorded in the task's outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreflightError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Target discovery failed
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Task expansion failed
    #[error("Expansion failed: {0}")]
    Expansion(#[from] ExpansionError),

    /// A task's process could not be started
    #[error("Execution failed: {0}")]
    Execution(#[from] ExecutionError),
}

/// Errors while enumerating validation targets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Source root (or its examples directory) could not be read
    #[error("Cannot read '{path}': {reason}")]
    Unreadable {
        /// Path that failed to read.
        path: String,
        /// Underlying IO error message.
        reason: String,
    },

    /// A feature set references a flag outside the declared vocabulary
    #[error("Feature set '{set}' uses unknown flag '{flag}'")]
    UnknownFlag {
        /// The undeclared flag.
        flag: String,
        /// Name of the offending feature set.
        set: String,
    },

    /// A feature set combines two flags declared mutually exclusive
    #[error("Feature set '{set}' combines conflicting flags '{first}' and '{second}'")]
    ConflictingFlags {
        /// First flag of the conflicting pair.
        first: String,
        /// Second flag of the conflicting pair.
        second: String,
        /// Name of the offending feature set.
        set: String,
    },

    /// Two configured feature sets resolve to the same name
    #[error("Duplicate feature set '{name}'")]
    DuplicateFeatureSet {
        /// The duplicated set name.
        name: String,
    },
}

/// Errors while expanding targets into the task queue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    /// Two tasks were expanded with the same identifier
    #[error("Duplicate task id '{id}'")]
    DuplicateTask {
        /// The duplicated task id.
        id: String,
    },

    /// A task was declared with no command to run
    #[error("Task '{id}' has an empty command")]
    EmptyCommand {
        /// Id of the offending task.
        id: String,
    },

    /// A configured task command string could not be parsed into argv
    #[error("Task '{id}' has a malformed command: {reason}")]
    MalformedCommand {
        /// Id of the offending task.
        id: String,
        /// Parser error message.
        reason: String,
    },
}

/// A task's process could not be started at all
///
/// Distinct from a task that ran and exited nonzero: a spawn failure means
/// the check never happened, so the controller escalates it to a Blocking
/// failure regardless of the task's declared class.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The executable could not be spawned (not found, not executable, ...)
    #[error("Cannot start '{command}': {reason}")]
    Spawn {
        /// The command that failed to start.
        command: String,
        /// Underlying spawn error message.
        reason: String,
    },
}

/// Errors while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config '{path}': {reason}")]
    Read {
        /// Path of the config file.
        path: String,
        /// Underlying IO error message.
        reason: String,
    },

    /// Config file is not valid YAML for the expected shape
    #[error("Cannot parse config '{path}': {reason}")]
    Parse {
        /// Path of the config file.
        path: String,
        /// Parser error message.
        reason: String,
    },

    /// Flag vocabulary contains an empty or duplicate name
    #[error("Invalid flag vocabulary: {reason}")]
    InvalidVocabulary {
        /// What is wrong with the vocabulary.
        reason: String,
    },
}
