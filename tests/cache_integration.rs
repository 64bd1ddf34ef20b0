//! Integration tests for the cache public API.
//! Exercises cache set/get, invalidation, cleanup and save/load from outside the crate.

use scirap::analyzer::EvaluationEngine;
use scirap::cache::{EvaluationCache, CACHE_FILENAME};
use scirap::rules::builtin_table;
use scirap::{Evaluation, Rating};
use std::path::{Path, PathBuf};

const DMSO_TEXT: &str = "Cells were exposed to DMSO as vehicle control.";

fn make_result(path: &str, text: &str) -> Evaluation {
    EvaluationEngine::new(builtin_table().unwrap())
        .evaluate_text(text, Path::new(path))
        .unwrap()
}

fn fingerprint() -> String {
    builtin_table().unwrap().fingerprint().to_string()
}

#[test]
fn cache_hit_requires_same_content_and_rules() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut cache = EvaluationCache::new(dir.path());
    let fp = fingerprint();

    cache.set(
        Path::new("a.txt"),
        DMSO_TEXT.as_bytes(),
        &fp,
        make_result("a.txt", DMSO_TEXT),
    );

    assert!(cache.get(Path::new("a.txt"), DMSO_TEXT.as_bytes(), &fp).is_some());
    assert!(cache.get(Path::new("a.txt"), b"edited text", &fp).is_none());
    assert!(cache
        .get(Path::new("a.txt"), DMSO_TEXT.as_bytes(), "other-rules")
        .is_none());
    assert!(cache.get(Path::new("b.txt"), DMSO_TEXT.as_bytes(), &fp).is_none());
}

#[test]
fn cache_cleanup_evicts_entries_not_in_existing_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut cache = EvaluationCache::new(dir.path());
    let fp = fingerprint();

    cache.set(Path::new("docs/a.txt"), b"content a", &fp, make_result("docs/a.txt", "a"));
    cache.set(Path::new("docs/b.txt"), b"content b", &fp, make_result("docs/b.txt", "b"));
    cache.set(Path::new("other/c.txt"), b"content c", &fp, make_result("other/c.txt", "c"));
    assert_eq!(cache.stats().entries, 3);

    cache.cleanup(Path::new("docs"), &[PathBuf::from("docs/a.txt")]);

    assert_eq!(cache.stats().entries, 2);
    assert!(cache.get(Path::new("docs/a.txt"), b"content a", &fp).is_some());
    assert!(cache.get(Path::new("docs/b.txt"), b"content b", &fp).is_none());
    assert!(cache.get(Path::new("other/c.txt"), b"content c", &fp).is_some());
}

#[test]
fn cache_save_and_reload_persists_entries() {
    let dir = tempfile::TempDir::new().unwrap();
    let fp = fingerprint();
    let original = make_result("persist.txt", DMSO_TEXT);

    {
        let mut cache = EvaluationCache::new(dir.path());
        cache.set(
            Path::new("persist.txt"),
            DMSO_TEXT.as_bytes(),
            &fp,
            original.clone(),
        );
        cache.save().unwrap();
    }
    assert!(dir.path().join(CACHE_FILENAME).exists());

    {
        let cache = EvaluationCache::new(dir.path());
        let cached = cache
            .get(Path::new("persist.txt"), DMSO_TEXT.as_bytes(), &fp)
            .expect("cache should persist after save/load");
        assert_eq!(cached.overall.total, original.overall.total);
        assert_eq!(cached.overall.rating, Rating::Low);
        for (c, o) in cached.checklists.iter().zip(&original.checklists) {
            assert_eq!(c.results, o.results);
        }
    }
}

#[test]
fn disabled_cache_never_writes() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut cache = EvaluationCache::disabled();
    let fp = fingerprint();

    cache.set(Path::new("x.txt"), b"x", &fp, make_result("x.txt", "x"));
    assert!(cache.get(Path::new("x.txt"), b"x", &fp).is_none());
    cache.save().unwrap();
    assert!(!dir.path().join(CACHE_FILENAME).exists());
}

#[test]
fn corrupt_cache_file_starts_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join(CACHE_FILENAME), "{ not json").unwrap();

    let cache = EvaluationCache::new(dir.path());
    assert_eq!(cache.stats().entries, 0);
}
