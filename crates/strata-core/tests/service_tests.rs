use std::fs;
use std::path::{Path, PathBuf};

use strata_core::{
    unified_search, ClassRef, Config, IndexService, IndexSource, IndexStore, QueryEngine, ServiceError,
};
use tempfile::TempDir;

const E2E_SOURCE: &str =
    "package com.acme; class Base {} class Child extends Base { int x; void run(String s) {} }";

fn create_repo(root: &Path) -> PathBuf {
    let repo = root.join("acme");
    fs::create_dir_all(&repo).unwrap();
    fs::write(repo.join("Child.java"), E2E_SOURCE).unwrap();
    repo
}

fn config_for(temp: &TempDir, repo: &Path) -> Config {
    let mut config = Config::default();
    config.repository.path = repo.to_string_lossy().to_string();
    config.cache.cache_dir = temp.path().join("cache").to_string_lossy().to_string();
    config
}

#[test]
fn test_end_to_end() {
    let temp = TempDir::new().unwrap();
    let repo = create_repo(temp.path());
    let service = IndexService::new(config_for(&temp, &repo));

    let (index, source) = service.build_or_load().unwrap();
    assert_eq!(source, IndexSource::Built);

    let engine = QueryEngine::new(&index);
    assert_eq!(
        engine.super_classes("com.acme.Child"),
        vec![ClassRef::new("com.acme", "Base")]
    );
    assert_eq!(
        engine.sub_classes("com.acme.Base"),
        vec![ClassRef::new("com.acme", "Child")]
    );

    let options = service.search_options();
    let methods = unified_search(&index, "com.acme.Child", Some("run(String s)"), None, options).unwrap();
    assert_eq!(methods.len(), 1);
    assert!(methods[0].contains("void run(String s) {}"));

    let fields = unified_search(&index, "com.acme.Child", None, Some("x"), options).unwrap();
    assert_eq!(fields.len(), 1);
    assert!(fields[0].starts_with("Field: x (Type: int)"));
}

#[test]
fn test_second_call_loads_from_cache() {
    let temp = TempDir::new().unwrap();
    let repo = create_repo(temp.path());
    let service = IndexService::new(config_for(&temp, &repo));

    let (built, source) = service.build_or_load().unwrap();
    assert_eq!(source, IndexSource::Built);
    assert!(service.store().cache_exists());

    let (loaded, source) = service.build_or_load().unwrap();
    assert_eq!(source, IndexSource::Cache);
    assert_eq!(loaded, built);
}

#[test]
fn test_cache_disabled_never_writes() {
    let temp = TempDir::new().unwrap();
    let repo = create_repo(temp.path());
    let mut config = config_for(&temp, &repo);
    config.cache.enabled = false;
    let service = IndexService::new(config);

    let (_, source) = service.build_or_load().unwrap();
    assert_eq!(source, IndexSource::Built);
    assert!(!service.store().cache_exists());
}

#[test]
fn test_rebuild_on_startup_ignores_snapshot() {
    let temp = TempDir::new().unwrap();
    let repo = create_repo(temp.path());
    let mut config = config_for(&temp, &repo);
    IndexService::new(config.clone()).build_or_load().unwrap();

    config.cache.rebuild_on_startup = true;
    let (_, source) = IndexService::new(config).build_or_load().unwrap();
    assert_eq!(source, IndexSource::Built);
}

#[test]
fn test_corrupt_cache_falls_back_to_build() {
    let temp = TempDir::new().unwrap();
    let repo = create_repo(temp.path());
    let service = IndexService::new(config_for(&temp, &repo));

    fs::create_dir_all(service.store().cache_dir()).unwrap();
    fs::write(service.store().cache_file(), "not json").unwrap();

    let (index, source) = service.build_or_load().unwrap();
    assert_eq!(source, IndexSource::Built);
    assert!(!index.is_empty());

    // The rebuilt snapshot replaced the corrupt file.
    assert_eq!(service.store().load_index().unwrap(), index);
}

#[test]
fn test_build_failure_names_file() {
    let temp = TempDir::new().unwrap();
    let repo = create_repo(temp.path());
    fs::write(repo.join("broken.go"), "package broken\nfunc (\n").unwrap();
    let service = IndexService::new(config_for(&temp, &repo));

    let err = service.build_or_load().unwrap_err();
    assert!(matches!(err, ServiceError::Build(_)));
    assert!(err.to_string().contains("broken.go"));
    assert!(!service.store().cache_exists());
}

#[test]
fn test_cache_info_and_clear() {
    let temp = TempDir::new().unwrap();
    let repo = create_repo(temp.path());
    let service = IndexService::new(config_for(&temp, &repo));
    service.build().unwrap();

    let info = service.cache_info().unwrap();
    assert!(info.enabled);
    assert_eq!(info.files.len(), 1);
    assert!(info.cache_file.ends_with("acme_ast_index.json"));

    assert_eq!(service.clear_cache().unwrap().len(), 1);
    assert!(service.list_cache_files().unwrap().is_empty());
}
