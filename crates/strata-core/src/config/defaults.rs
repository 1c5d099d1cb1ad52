//! Default values for Strata configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Repository Defaults
// ============================================================================

/// Repository root indexed when none is configured.
pub const DEFAULT_REPOSITORY_PATH: &str = ".";

// ============================================================================
// Cache Defaults
// ============================================================================

/// Whether built indexes are persisted and reused.
pub const DEFAULT_CACHE_ENABLED: bool = true;

/// Directory holding cache snapshots.
pub const DEFAULT_CACHE_DIR: &str = "./cache";

/// Rebuild on startup even when a snapshot exists.
pub const DEFAULT_REBUILD_ON_STARTUP: bool = false;

/// Suffix appended to the sanitized repository name.
pub const CACHE_FILE_SUFFIX: &str = "_ast_index.json";

/// Format version written into every snapshot.
pub const CACHE_FORMAT_VERSION: &str = "1.0";

/// Fallback cache key when the repository root has no usable base name.
pub const DEFAULT_REPOSITORY_NAME: &str = "repository";

// ============================================================================
// Search Defaults
// ============================================================================

/// Context lines around a class snippet.
pub const DEFAULT_CLASS_CONTEXT_LINES: usize = 100;

/// Context lines around method and field snippets.
pub const DEFAULT_MEMBER_CONTEXT_LINES: usize = 1;

// ============================================================================
// Parser Defaults
// ============================================================================

/// Package assigned to Java files without a package declaration.
pub const DEFAULT_JAVA_PACKAGE: &str = "default.package";

// ============================================================================
// File Names
// ============================================================================

/// Project-local configuration file.
pub const PROJECT_CONFIG_FILE: &str = "strata.toml";

/// Directory under the user config dir.
pub const USER_CONFIG_DIR: &str = "strata";

/// User configuration file name.
pub const USER_CONFIG_FILE: &str = "config.toml";
