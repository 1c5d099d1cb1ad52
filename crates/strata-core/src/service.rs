//! Build-or-load orchestration.
//!
//! The service owns the configuration, the parser manager and the snapshot
//! store for one repository. Cache problems never reach the caller: a
//! failed load falls back to a fresh build, a failed save is logged and the
//! in-memory index is still returned.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::ast::AstIndex;
use crate::config::Config;
use crate::parser::{BuildError, ParserManager};
use crate::query::SearchOptions;
use crate::storage::{CacheInfo, FileIndexStore, IndexStore, StorageError};

/// Errors surfaced by [`IndexService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Where an index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Built,
    Cache,
}

pub struct IndexService {
    config: Config,
    repository_root: PathBuf,
    manager: ParserManager,
    store: FileIndexStore,
}

impl IndexService {
    /// Create a service for the repository named in `config`.
    pub fn new(config: Config) -> Self {
        let configured = PathBuf::from(&config.repository.path);
        let repository_root = configured.canonicalize().unwrap_or(configured);
        let store = FileIndexStore::new(&config.cache, &repository_root);
        Self {
            config,
            repository_root,
            manager: ParserManager::new(),
            store,
        }
    }

    pub fn repository_root(&self) -> &Path {
        &self.repository_root
    }

    pub fn store(&self) -> &FileIndexStore {
        &self.store
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::from(&self.config.search)
    }

    /// Return an index, preferring the cache.
    ///
    /// - cache disabled: build, do not save
    /// - rebuild on startup: build and save
    /// - snapshot present: load, building on any load failure
    /// - no snapshot: build and save
    pub fn build_or_load(&self) -> Result<(AstIndex, IndexSource), ServiceError> {
        let cache = &self.config.cache;
        if !cache.enabled {
            return Ok((self.build_fresh()?, IndexSource::Built));
        }

        if !cache.rebuild_on_startup && self.store.cache_exists() {
            match self.store.load_index() {
                Ok(index) => return Ok((index, IndexSource::Cache)),
                Err(e) => warn!(error = %e, "cache load failed, rebuilding"),
            }
        }

        Ok((self.build()?, IndexSource::Built))
    }

    /// Build and, when caching is enabled, save the snapshot.
    pub fn build(&self) -> Result<AstIndex, ServiceError> {
        let index = self.build_fresh()?;
        if self.config.cache.enabled {
            if let Err(e) = self.store.save_index(&index) {
                warn!(error = %e, "failed to save index snapshot");
            }
        }
        Ok(index)
    }

    fn build_fresh(&self) -> Result<AstIndex, BuildError> {
        info!(root = %self.repository_root.display(), "parsing repository");
        self.manager.build_index_from_dir(&self.repository_root)
    }

    pub fn cache_info(&self) -> Result<CacheInfo, ServiceError> {
        Ok(CacheInfo {
            cache_dir: self.store.cache_dir().to_path_buf(),
            enabled: self.config.cache.enabled,
            rebuild_on_startup: self.config.cache.rebuild_on_startup,
            cache_file: self.store.cache_file().to_path_buf(),
            files: self.store.file_info()?,
        })
    }

    pub fn clear_cache(&self) -> Result<Vec<PathBuf>, ServiceError> {
        Ok(self.store.clear_cache()?)
    }

    pub fn list_cache_files(&self) -> Result<Vec<PathBuf>, ServiceError> {
        Ok(self.store.list_cache_files()?)
    }
}
