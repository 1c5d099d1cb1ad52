//! Index snapshot persistence.

mod error;
mod file;

pub use error::StorageError;
pub use file::FileIndexStore;

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::ast::{AstIndex, AstNode};

/// Trait for index snapshot backends.
///
/// A store is bound to one repository; every operation works on that
/// repository's single current snapshot.
pub trait IndexStore {
    /// Serializes the index, replacing any previous snapshot. Returns the
    /// written path.
    fn save_index(&self, index: &AstIndex) -> Result<PathBuf, StorageError>;

    /// Loads the snapshot verbatim. Hierarchy resolution is not re-run.
    fn load_index(&self) -> Result<AstIndex, StorageError>;

    /// Whether a snapshot exists.
    fn cache_exists(&self) -> bool;

    /// Removes the snapshot, returning the deleted paths.
    fn clear_cache(&self) -> Result<Vec<PathBuf>, StorageError>;

    /// Lists existing snapshot files for this repository.
    fn list_cache_files(&self) -> Result<Vec<PathBuf>, StorageError>;
}

/// Header written alongside the nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub repository_path: String,
    pub build_time: DateTime<Utc>,
    pub node_count: usize,
    pub cache_version: String,
}

/// On-disk form of an index. Nodes are keyed by id in sorted order so
/// identical indexes produce identical files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub metadata: CacheMetadata,
    pub nodes: BTreeMap<String, AstNode>,
}

impl CacheSnapshot {
    pub fn into_index(self) -> AstIndex {
        AstIndex::from_nodes(self.nodes)
    }
}

/// One snapshot file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct CacheFileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// Cache state reported to the user.
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub cache_dir: PathBuf,
    pub enabled: bool,
    pub rebuild_on_startup: bool,
    pub cache_file: PathBuf,
    pub files: Vec<CacheFileInfo>,
}
