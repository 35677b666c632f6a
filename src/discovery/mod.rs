//! Validation target discovery
//!
//! Enumerates the dynamic targets of a validation run: the example programs
//! present in the source tree and the configured feature-flag combinations.
//! Discovery decouples *what to validate* from *how to validate it*; the
//! expansion and controller layers only ever see the immutable sequences
//! produced here, so they can be unit-tested against hand-built lists.
//!
//! Discovery is deterministic: for a fixed tree and configuration, repeated
//! calls yield identical sequences.

use crate::pipeline::errors::DiscoveryError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One example program found in the source tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleTarget {
    /// Example name as cargo knows it (`--example <name>`).
    pub name: String,

    /// Path of the example entry point.
    pub path: PathBuf,
}

/// One named combination of optional capabilities to validate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Stable name, derived from the flags (`none` for the empty set).
    pub name: String,

    /// Flags enabled in this combination, kept ordered for stable rendering.
    pub flags: BTreeSet<String>,
}

impl FeatureSet {
    /// Builds a set from a flag list, deriving its name
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let flags: BTreeSet<String> = flags.into_iter().map(Into::into).collect();
        let name = if flags.is_empty() {
            "none".to_string()
        } else {
            flags.iter().cloned().collect::<Vec<_>>().join("+")
        };
        Self { name, flags }
    }

    /// Renders the flags as the comma list cargo expects
    #[must_use]
    pub fn cargo_features(&self) -> String {
        self.flags.iter().cloned().collect::<Vec<_>>().join(",")
    }

    /// Returns true if no flags are enabled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Scans the source tree for example programs
///
/// Both cargo example layouts are recognized: `examples/<name>.rs` and
/// `examples/<name>/main.rs`. Names on the denylist are excluded. Results
/// are sorted by name so a fixed tree always yields the identical list.
///
/// A missing `examples/` directory is not an error; a project without
/// examples has an empty target list. An unreadable source root is.
pub fn discover_examples(
    source_root: &Path,
    denylist: &[String],
) -> Result<Vec<ExampleTarget>, DiscoveryError> {
    let unreadable = |path: &Path, err: &std::io::Error| DiscoveryError::Unreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    };

    fs::metadata(source_root).map_err(|e| unreadable(source_root, &e))?;

    let examples_dir = source_root.join("examples");
    if !examples_dir.is_dir() {
        tracing::debug!(root = %source_root.display(), "No examples directory");
        return Ok(Vec::new());
    }

    let mut targets = Vec::new();
    let entries = fs::read_dir(&examples_dir).map_err(|e| unreadable(&examples_dir, &e))?;
    for entry in entries {
        let entry = entry.map_err(|e| unreadable(&examples_dir, &e))?;
        let path = entry.path();

        let name = if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
            path.file_stem().map(|s| s.to_string_lossy().into_owned())
        } else if path.is_dir() && path.join("main.rs").is_file() {
            path.file_name().map(|s| s.to_string_lossy().into_owned())
        } else {
            None
        };

        let Some(name) = name else { continue };

        if denylist.contains(&name) {
            tracing::debug!(example = %name, "Excluded by denylist");
            continue;
        }

        targets.push(ExampleTarget { name, path });
    }

    targets.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::info!(count = targets.len(), "Discovered examples");
    Ok(targets)
}

/// Resolves the configured feature-combination policy into feature sets
///
/// The combinations are a deliberate, configured subset of the possible
/// flags, never a computed power set. Every flag must belong to the declared
/// vocabulary, no set may combine a pair declared mutually exclusive, and
/// set names must be unique. Configuration order is preserved.
pub fn discover_feature_sets(
    vocabulary: &[String],
    combinations: &[Vec<String>],
    conflicts: &[(String, String)],
) -> Result<Vec<FeatureSet>, DiscoveryError> {
    let known: HashSet<&str> = vocabulary.iter().map(String::as_str).collect();
    let mut seen_names = HashSet::new();
    let mut sets = Vec::with_capacity(combinations.len());

    for combo in combinations {
        let set = FeatureSet::from_flags(combo.iter().cloned());

        for flag in &set.flags {
            if !known.contains(flag.as_str()) {
                return Err(DiscoveryError::UnknownFlag {
                    flag: flag.clone(),
                    set: set.name.clone(),
                });
            }
        }

        for (first, second) in conflicts {
            if set.flags.contains(first) && set.flags.contains(second) {
                return Err(DiscoveryError::ConflictingFlags {
                    first: first.clone(),
                    second: second.clone(),
                    set: set.name.clone(),
                });
            }
        }

        if !seen_names.insert(set.name.clone()) {
            return Err(DiscoveryError::DuplicateFeatureSet { name: set.name });
        }

        sets.push(set);
    }

    tracing::info!(count = sets.len(), "Resolved feature sets");
    Ok(sets)
}
