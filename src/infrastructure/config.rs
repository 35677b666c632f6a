//! Configuration management
//!
//! Everything the pipeline treats as policy lives here, externally supplied
//! and never hard-coded: the optional-feature vocabulary, the combination
//! list to test under, the example denylist, mutually exclusive flag pairs,
//! per-task timeout, advisory strictness, extra environment and extra
//! configured tasks. Loaded from `preflight.yaml` when present, with
//! defaults for every field.

use crate::pipeline::errors::ConfigError;
use crate::pipeline::task::TaskClass;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default config file name, resolved relative to the source root.
pub const CONFIG_FILE_NAME: &str = "preflight.yaml";

/// Validation run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Name of the package under validation (informational, used in logs).
    pub package: String,

    /// Vocabulary of optional feature flags, declared once per run.
    pub flags: Vec<String>,

    /// Combinations to run the test suite under. A deliberate subset of the
    /// possible combinations, chosen by policy; never computed from `flags`.
    pub feature_sets: Vec<Vec<String>>,

    /// Flag pairs that may never co-occur in one feature set.
    pub conflicts: Vec<(String, String)>,

    /// Example names excluded from discovery.
    pub example_denylist: Vec<String>,

    /// Per-task timeout in seconds; `None` means no timeout.
    pub timeout_per_task_secs: Option<u64>,

    /// When true, an advisory failure aborts the queue like a blocking one.
    /// When false (default), it is recorded, the queue keeps going, and the
    /// final verdict still fails.
    pub strict_advisory: bool,

    /// Extra environment applied to every spawned task.
    pub env: BTreeMap<String, String>,

    /// Additional configured tasks, run after the built-in checks and
    /// before the publish dry run.
    pub extra_tasks: Vec<ExtraTask>,
}

/// One extra task declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraTask {
    /// Task id, unique across the whole expanded queue.
    pub id: String,

    /// Command line, split into argv with shell quoting rules. `${VAR}`
    /// references are expanded against the config `env`.
    pub command: String,

    /// Fail-fast classification.
    #[serde(default = "default_extra_class")]
    pub class: TaskClass,

    /// Human-readable description for reports.
    #[serde(default)]
    pub description: String,
}

fn default_extra_class() -> TaskClass {
    TaskClass::Advisory
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package: "amqprs".to_string(),
            flags: vec![
                "traces".to_string(),
                "compliance_assert".to_string(),
                "tls".to_string(),
                "urispec".to_string(),
            ],
            feature_sets: vec![
                vec![],
                vec!["traces".to_string()],
                vec!["compliance_assert".to_string()],
                vec!["tls".to_string()],
                vec!["urispec".to_string()],
                vec![
                    "traces".to_string(),
                    "compliance_assert".to_string(),
                    "tls".to_string(),
                    "urispec".to_string(),
                ],
            ],
            conflicts: Vec::new(),
            example_denylist: vec!["basic_consumer".to_string()],
            timeout_per_task_secs: None,
            strict_advisory: false,
            env: BTreeMap::new(),
            extra_tasks: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration for a run
    ///
    /// With an explicit path the file must exist and parse. Without one,
    /// `preflight.yaml` under the source root is used when present and the
    /// defaults otherwise.
    pub fn load(source_root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = source_root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    tracing::debug!("No config file, using defaults");
                    let config = Self::default();
                    config.validate()?;
                    return Ok(config);
                }
                candidate
            }
        };

        let text = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;

        tracing::info!(config = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validates the flag vocabulary
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for flag in &self.flags {
            if flag.is_empty() {
                return Err(ConfigError::InvalidVocabulary {
                    reason: "empty flag name".to_string(),
                });
            }
            if !seen.insert(flag.as_str()) {
                return Err(ConfigError::InvalidVocabulary {
                    reason: format!("duplicate flag '{flag}'"),
                });
            }
        }
        Ok(())
    }

    /// Per-task timeout as a duration
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_per_task_secs.map(Duration::from_secs)
    }
}

/// Expands `${VAR}` references in a configured string
///
/// Unknown variables are left unchanged so the spawned tool sees the
/// literal reference and can report it.
#[must_use]
pub fn expand_variables(input: &str, env: &BTreeMap<String, String>) -> String {
    static VAR_PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

    VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            match env.get(name) {
                Some(value) => value.clone(),
                None => caps
                    .get(0)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            }
        })
        .to_string()
}
