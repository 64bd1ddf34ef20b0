//! Configuration loading for SciRAP

mod schema;

pub use schema::{Config, ConfigOverride, EffectiveConfig};

use crate::rules::{builtin_table, RuleSet, RuleTable, RULE_SET_VERSION};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".sciraprc.json";

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            log::debug!("Using config {}", path.display());
            load_config_with_extends(&path, &mut HashSet::new())
        }
        None => Ok(Config::default()),
    }
}

/// Load a config file and resolve extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if !visited.insert(canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    if let Some(rules) = config.rules.take() {
        config.rules = Some(if rules.is_absolute() {
            rules
        } else {
            config_dir.join(rules)
        });
    }

    if let Some(extends) = config.extends.take() {
        let base_config = resolve_extends(config_path, &extends, visited)?;
        config.merge_from(base_config);
    }

    Ok(config)
}

/// Resolve an extends reference to a config
fn resolve_extends(
    config_path: &Path,
    extends: &str,
    visited: &mut HashSet<PathBuf>,
) -> Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let extends_path = if Path::new(extends).is_absolute() {
        PathBuf::from(extends)
    } else {
        config_dir.join(extends)
    };

    let extends_path = if extends_path.extension().is_none() {
        extends_path.with_extension("json")
    } else {
        extends_path
    };

    if !extends_path.exists() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            extends_path.display(),
            config_path.display()
        );
    }

    load_config_with_extends(&extends_path, visited)
}

/// Search for .sciraprc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Reject a pass/fail threshold outside 0..=100 (NaN included)
pub fn check_threshold(value: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&value) {
        anyhow::bail!("threshold must be between 0 and 100, got {}", value);
    }
    Ok(())
}

/// Range-check the top-level threshold and every override threshold
pub fn validate_thresholds(config: &Config) -> Result<()> {
    if let Some(threshold) = config.threshold {
        check_threshold(threshold)?;
    }
    for (i, entry) in config.overrides.iter().enumerate() {
        if let Some(threshold) = entry.threshold {
            check_threshold(threshold).with_context(|| {
                format!("Invalid override #{} ({})", i + 1, entry.files.join(", "))
            })?;
        }
    }
    Ok(())
}

/// Load the rule table a config selects: the custom rule file when set,
/// otherwise the built-in SciRAP table, then any rating threshold override.
pub fn load_rule_table(config: &Config) -> Result<RuleTable> {
    let table = match &config.rules {
        Some(path) => load_rule_file(path)?,
        None => builtin_table()?.clone(),
    };

    match config.rating_thresholds {
        Some(thresholds) => table
            .with_thresholds(thresholds)
            .context("Invalid ratingThresholds in config"),
        None => Ok(table),
    }
}

/// Read and validate a JSON rule file
pub fn load_rule_file(path: &Path) -> Result<RuleTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule file: {}", path.display()))?;
    let set: RuleSet = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in rule file: {}", path.display()))?;
    if set.version > RULE_SET_VERSION {
        anyhow::bail!(
            "Rule file {} has version {}, this build supports up to {}",
            path.display(),
            set.version,
            RULE_SET_VERSION
        );
    }
    RuleTable::load(set).with_context(|| format!("Invalid rule file: {}", path.display()))
}

/// Build a GlobSet from ignore patterns for path matching
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Check if a path should be ignored based on config glob patterns
pub fn is_ignored(path: &Path, ignore_set: &GlobSet) -> bool {
    ignore_set.is_match(path)
}

/// Find the project root directory (containing .git or a config file)
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        if dir.join(".git").exists() || dir.join(CONFIG_FILENAME).exists() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}
