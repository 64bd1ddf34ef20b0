//! Config schema and deserialization

use crate::analyzer::RatingThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-path override configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverride {
    /// Glob patterns this override applies to
    pub files: Vec<String>,

    /// Optional minimum percentage for matched documents
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Root config structure for .sciraprc.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Minimum combined percentage (exit 1 if below)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    /// Custom rule file replacing the built-in SciRAP keywords.
    /// Relative paths are resolved against the config file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,

    /// Rating cut points; replaces the thresholds of the rule set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_thresholds: Option<RatingThresholds>,

    /// Glob patterns for files/directories to exclude
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,

    /// Document extensions to collect when given a directory
    /// (default: txt, text, md, plus pdf when built with PDF support)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,

    /// Hex SHA-256 of the shared access key; when set the CLI requires the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_sha256: Option<String>,

    /// Per-path configuration overrides
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ConfigOverride>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(mut self, cli_threshold: Option<f64>, cli_rules: Option<&Path>) -> Self {
        if cli_threshold.is_some() {
            self.threshold = cli_threshold;
        }
        if let Some(rules) = cli_rules {
            self.rules = Some(rules.to_path_buf());
        }
        self
    }

    /// Get effective config for a specific document path, applying overrides
    pub fn effective_for_file(&self, file_path: &Path) -> EffectiveConfig {
        let mut effective = EffectiveConfig {
            threshold: self.threshold,
        };

        for override_cfg in &self.overrides {
            if Self::matches_override(file_path, &override_cfg.files) {
                if let Some(threshold) = override_cfg.threshold {
                    effective.threshold = Some(threshold);
                }
            }
        }

        effective
    }

    fn matches_override(file_path: &Path, patterns: &[String]) -> bool {
        let path_str = file_path.to_string_lossy();
        patterns.iter().any(|pattern| match globset::Glob::new(pattern) {
            Ok(glob) => {
                glob.compile_matcher().is_match(file_path)
                    || path_str.contains(pattern.trim_start_matches("**/"))
            }
            Err(_) => false,
        })
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        if self.threshold.is_none() {
            self.threshold = base.threshold;
        }
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.rules.is_none() {
            self.rules = base.rules;
        }
        if self.rating_thresholds.is_none() {
            self.rating_thresholds = base.rating_thresholds;
        }
        if self.access_key_sha256.is_none() {
            self.access_key_sha256 = base.access_key_sha256;
        }
        if self.extensions.is_empty() {
            self.extensions = base.extensions;
        }

        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;

        // Base overrides first so this config's overrides win
        let mut all_overrides = base.overrides;
        all_overrides.append(&mut self.overrides);
        self.overrides = all_overrides;
    }

    /// Extensions collected from directories, lowercase and without the dot
    pub fn document_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            let mut extensions: Vec<String> = crate::extract::TEXT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect();
            if cfg!(feature = "pdf") {
                extensions.push("pdf".to_string());
            }
            extensions
        } else {
            self.extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect()
        }
    }
}

/// Effective configuration for a specific document (after applying overrides)
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub threshold: Option<f64>,
}
