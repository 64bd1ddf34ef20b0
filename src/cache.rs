//! Evaluation result caching
//!
//! Caches evaluations keyed by the document's byte hash and the fingerprint of
//! the rule table that scored it, so edited documents or changed rules are
//! always re-evaluated.

use crate::Evaluation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const CACHE_VERSION: u32 = 1;
pub const CACHE_FILENAME: &str = ".scirap-cache.json";

/// Cache entry for a single document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    /// SHA256 hash of the document bytes
    content_hash: String,
    /// Fingerprint of the rule table used
    rules_fingerprint: String,
    result: Evaluation,
    /// RFC 3339 timestamp when cached
    cached_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheData {
    version: u32,
    /// Map of document path to cache entry
    entries: HashMap<String, CacheEntry>,
}

impl Default for CacheData {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// Cache manager for evaluation results
pub struct EvaluationCache {
    cache_path: PathBuf,
    data: CacheData,
    dirty: bool,
    enabled: bool,
}

impl EvaluationCache {
    /// Open the cache file in `project_root`, starting empty if it is missing,
    /// unreadable or from another cache version
    pub fn new(project_root: &Path) -> Self {
        let cache_path = project_root.join(CACHE_FILENAME);
        let data = Self::load_cache(&cache_path).unwrap_or_default();

        Self {
            cache_path,
            data,
            dirty: false,
            enabled: true,
        }
    }

    /// Create a disabled cache (no-op)
    pub fn disabled() -> Self {
        Self {
            cache_path: PathBuf::new(),
            data: CacheData::default(),
            dirty: false,
            enabled: false,
        }
    }

    fn load_cache(path: &Path) -> Option<CacheData> {
        let content = fs::read_to_string(path).ok()?;
        let data: CacheData = match serde_json::from_str(&content) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Ignoring unreadable cache {}: {}", path.display(), e);
                return None;
            }
        };

        if data.version != CACHE_VERSION {
            log::debug!("Discarding cache version {}", data.version);
            return None;
        }

        Some(data)
    }

    /// Save cache to disk
    pub fn save(&self) -> Result<()> {
        if !self.enabled || !self.dirty {
            return Ok(());
        }

        let content =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize cache")?;
        fs::write(&self.cache_path, content)
            .with_context(|| format!("Failed to write cache to {}", self.cache_path.display()))?;

        Ok(())
    }

    /// SHA256 hash of document bytes
    pub fn hash_content(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    /// Get cached evaluation if the content and rules are unchanged
    pub fn get(&self, path: &Path, content: &[u8], rules_fingerprint: &str) -> Option<Evaluation> {
        if !self.enabled {
            return None;
        }

        let key = path.to_string_lossy();
        let entry = self.data.entries.get(key.as_ref())?;

        if entry.rules_fingerprint != rules_fingerprint {
            return None;
        }
        if entry.content_hash != Self::hash_content(content) {
            return None;
        }

        log::debug!("Cache hit for {}", path.display());
        Some(entry.result.clone())
    }

    /// Store an evaluation in the cache
    pub fn set(&mut self, path: &Path, content: &[u8], rules_fingerprint: &str, result: Evaluation) {
        if !self.enabled {
            return;
        }

        let entry = CacheEntry {
            content_hash: Self::hash_content(content),
            rules_fingerprint: rules_fingerprint.to_string(),
            result,
            cached_at: chrono::Utc::now().to_rfc3339(),
        };

        self.data
            .entries
            .insert(path.to_string_lossy().to_string(), entry);
        self.dirty = true;
    }

    /// Remove stale entries under `scanned_dir` for documents no longer collected there.
    /// Entries outside `scanned_dir` belong to other runs and are kept.
    pub fn cleanup(&mut self, scanned_dir: &Path, existing_files: &[PathBuf]) {
        if !self.enabled {
            return;
        }

        let existing: HashSet<String> = existing_files
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();

        let before = self.data.entries.len();
        self.data
            .entries
            .retain(|k, _| existing.contains(k) || !Path::new(k).starts_with(scanned_dir));
        if self.data.entries.len() != before {
            self.dirty = true;
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.data.entries.len(),
            enabled: self.enabled,
        }
    }

    /// Clear all cached entries
    pub fn clear(&mut self) {
        self.data.entries.clear();
        self.dirty = true;
    }
}

/// Cache statistics
#[derive(Debug)]
pub struct CacheStats {
    pub entries: usize,
    pub enabled: bool,
}
