use std::fs;
use std::path::Path;

use strata_core::config::{
    cache_file_name, CACHE_FILE_SUFFIX, DEFAULT_CACHE_DIR, DEFAULT_CLASS_CONTEXT_LINES,
    DEFAULT_MEMBER_CONTEXT_LINES,
};
use strata_core::{Config, SearchConfig};
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.cache.enabled);
    assert_eq!(config.cache.cache_dir, DEFAULT_CACHE_DIR);
    assert_eq!(config.search.class_context_lines, DEFAULT_CLASS_CONTEXT_LINES);
    assert_eq!(config.search.member_context_lines, DEFAULT_MEMBER_CONTEXT_LINES);
}

#[test]
fn test_config_to_toml() {
    let toml_str = Config::default_config_string();
    assert!(toml_str.contains("[repository]"));
    assert!(toml_str.contains("[cache]"));
    assert!(toml_str.contains("[search]"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[cache]
enabled = false
cache_dir = "/tmp/strata-cache"

[search]
class_context_lines = 20
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.cache_dir, "/tmp/strata-cache");
    assert!(!config.cache.rebuild_on_startup);
    assert_eq!(config.search.class_context_lines, 20);
    assert_eq!(config.search.member_context_lines, DEFAULT_MEMBER_CONTEXT_LINES);
}

#[test]
fn test_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strata.toml");
    fs::write(&path, "[search]\nmember_context_lines = 3\n").unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.search.member_context_lines, 3);
    assert_eq!(config.search.class_context_lines, SearchConfig::default().class_context_lines);
}

#[test]
fn test_invalid_toml_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strata.toml");
    fs::write(&path, "[cache\nenabled = ").unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_env_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strata.toml");
    fs::write(&path, "[repository]\npath = \"/from/file\"\n").unwrap();

    std::env::set_var("STRATA_REPOSITORY_PATH", "/from/env");
    std::env::set_var("STRATA_REBUILD_ON_STARTUP", "yes");
    let config = Config::from_file(&path);
    std::env::remove_var("STRATA_REPOSITORY_PATH");
    std::env::remove_var("STRATA_REBUILD_ON_STARTUP");

    let config = config.unwrap();
    assert_eq!(config.repository.path, "/from/env");
    assert!(config.cache.rebuild_on_startup);
}

#[test]
fn test_cache_file_name() {
    let name = cache_file_name(Path::new("/work/legacy app"));
    assert_eq!(name, format!("legacy_app{CACHE_FILE_SUFFIX}"));
}
