//! Configuration management for Strata.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `strata.toml` file
//! 3. User config `~/.config/strata/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repository to index.
    pub repository: RepositoryConfig,

    /// Cache snapshot configuration.
    pub cache: CacheConfig,

    /// Search snippet configuration.
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./strata.toml` (project local)
    /// 2. `~/.config/strata/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(PROJECT_CONFIG_FILE).exists() {
            return Self::from_file(PROJECT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(path) = std::env::var("STRATA_REPOSITORY_PATH") {
            self.repository.path = path;
        }
        if let Ok(dir) = std::env::var("STRATA_CACHE_DIR") {
            self.cache.cache_dir = dir;
        }
        if let Ok(value) = std::env::var("STRATA_CACHE_ENABLED") {
            self.cache.enabled = parse_bool("STRATA_CACHE_ENABLED", &value)?;
        }
        if let Ok(value) = std::env::var("STRATA_REBUILD_ON_STARTUP") {
            self.cache.rebuild_on_startup = parse_bool("STRATA_REBUILD_ON_STARTUP", &value)?;
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!("{name}: expected a boolean, got '{other}'"))),
    }
}

/// Repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Root directory of the source tree.
    pub path: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_REPOSITORY_PATH.to_string(),
        }
    }
}

/// Cache snapshot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Persist built indexes and reuse them on startup.
    pub enabled: bool,

    /// Directory holding snapshot files.
    pub cache_dir: String,

    /// Ignore an existing snapshot and rebuild.
    pub rebuild_on_startup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_CACHE_ENABLED,
            cache_dir: DEFAULT_CACHE_DIR.to_string(),
            rebuild_on_startup: DEFAULT_REBUILD_ON_STARTUP,
        }
    }
}

impl CacheConfig {
    /// Snapshot path for a repository root.
    ///
    /// One file per repository base name: two repositories with the same
    /// directory name share a cache file.
    pub fn cache_file_path(&self, repo_root: &Path) -> PathBuf {
        PathBuf::from(&self.cache_dir).join(cache_file_name(repo_root))
    }
}

/// `<sanitized base name>_ast_index.json`.
pub fn cache_file_name(repo_root: &Path) -> String {
    format!("{}{}", sanitize_repo_name(repo_root), CACHE_FILE_SUFFIX)
}

/// Base name of the repository root with spaces replaced by underscores.
///
/// Roots such as `.` have no base name of their own; the canonicalized
/// directory name is used instead.
pub fn sanitize_repo_name(repo_root: &Path) -> String {
    let base = repo_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            repo_root
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| DEFAULT_REPOSITORY_NAME.to_string());
    base.replace(' ', "_")
}

/// Search snippet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Context lines around class snippets.
    pub class_context_lines: usize,

    /// Context lines around method and field snippets.
    pub member_context_lines: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            class_context_lines: DEFAULT_CLASS_CONTEXT_LINES,
            member_context_lines: DEFAULT_MEMBER_CONTEXT_LINES,
        }
    }
}
