use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::ast::{AstIndex, AstNode};
use crate::config::{CacheConfig, CACHE_FORMAT_VERSION};

use super::error::StorageError;
use super::{CacheFileInfo, CacheMetadata, CacheSnapshot, IndexStore};

/// Borrowed snapshot used for writing without cloning every node.
#[derive(Serialize)]
struct SnapshotView<'a> {
    metadata: CacheMetadata,
    nodes: BTreeMap<&'a str, &'a AstNode>,
}

/// File-based snapshot store.
///
/// ```text
/// <cache_dir>/
///   <repo_name>_ast_index.json    # one current snapshot per repository name
/// ```
pub struct FileIndexStore {
    cache_dir: PathBuf,
    cache_file: PathBuf,
    repository_path: PathBuf,
}

impl FileIndexStore {
    /// Creates a store for `repository_path` inside the configured cache dir.
    pub fn new(config: &CacheConfig, repository_path: impl Into<PathBuf>) -> Self {
        let repository_path = repository_path.into();
        Self {
            cache_dir: PathBuf::from(&config.cache_dir),
            cache_file: config.cache_file_path(&repository_path),
            repository_path,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of this repository's snapshot, whether or not it exists.
    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Ensures the cache directory exists.
    fn ensure_cache_dir(&self) -> Result<(), StorageError> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir).map_err(|e| StorageError::io(&self.cache_dir, e))?;
        }
        Ok(())
    }

    /// Size and modification time of each existing snapshot file.
    pub fn file_info(&self) -> Result<Vec<CacheFileInfo>, StorageError> {
        self.list_cache_files()?
            .into_iter()
            .map(|path| {
                let meta = fs::metadata(&path).map_err(|e| StorageError::io(&path, e))?;
                let modified = meta.modified().ok().map(DateTime::<Local>::from);
                Ok(CacheFileInfo {
                    path,
                    size: meta.len(),
                    modified,
                })
            })
            .collect()
    }
}

impl IndexStore for FileIndexStore {
    fn save_index(&self, index: &AstIndex) -> Result<PathBuf, StorageError> {
        self.ensure_cache_dir()?;

        let snapshot = SnapshotView {
            metadata: CacheMetadata {
                repository_path: self.repository_path.to_string_lossy().into_owned(),
                build_time: Utc::now(),
                node_count: index.len(),
                cache_version: CACHE_FORMAT_VERSION.to_string(),
            },
            nodes: index.nodes().iter().map(|(id, node)| (id.as_str(), node)).collect(),
        };

        let path = self.cache_file.clone();
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json).map_err(|e| StorageError::io(&path, e))?;

        info!(path = %path.display(), nodes = index.len(), "saved index snapshot");
        Ok(path)
    }

    fn load_index(&self) -> Result<AstIndex, StorageError> {
        let path = &self.cache_file;
        if !path.exists() {
            return Err(StorageError::CacheMiss { path: path.clone() });
        }

        let json = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        let snapshot: CacheSnapshot =
            serde_json::from_str(&json).map_err(|source| StorageError::Deserialize {
                path: path.clone(),
                source,
            })?;

        debug!(
            version = %snapshot.metadata.cache_version,
            built = %snapshot.metadata.build_time,
            "read index snapshot"
        );
        let index = snapshot.into_index();
        info!(path = %path.display(), nodes = index.len(), "loaded index snapshot");
        Ok(index)
    }

    fn cache_exists(&self) -> bool {
        self.cache_file.exists()
    }

    fn clear_cache(&self) -> Result<Vec<PathBuf>, StorageError> {
        let files = self.list_cache_files()?;
        for path in &files {
            fs::remove_file(path).map_err(|e| StorageError::io(path, e))?;
            info!(path = %path.display(), "removed index snapshot");
        }
        Ok(files)
    }

    fn list_cache_files(&self) -> Result<Vec<PathBuf>, StorageError> {
        if self.cache_file.is_file() {
            Ok(vec![self.cache_file.clone()])
        } else {
            Ok(Vec::new())
        }
    }
}
