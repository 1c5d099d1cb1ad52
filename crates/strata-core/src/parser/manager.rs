//! Directory walk and parallel parse into one index.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::{debug, info};

use super::error::BuildError;
use super::registry::ParserRegistry;
use super::traits::Parser;
use crate::ast::AstIndex;
use crate::hierarchy::resolve_class_hierarchy;

/// Builds an [`AstIndex`] from a source tree.
pub struct ParserManager {
    registry: ParserRegistry,
}

impl ParserManager {
    pub fn new() -> Self {
        Self::with_registry(ParserRegistry::new())
    }

    pub fn with_registry(registry: ParserRegistry) -> Self {
        Self { registry }
    }

    /// Parse every recognized file under `root` and resolve the class
    /// hierarchy once at the end.
    ///
    /// Files are parsed in parallel; each file's nodes are inserted under a
    /// single lock. The first failing file aborts the build and no index is
    /// returned.
    pub fn build_index_from_dir(&self, root: &Path) -> Result<AstIndex, BuildError> {
        if !root.is_dir() {
            return Err(BuildError::Walk {
                path: root.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let files = self.collect_files(root)?;
        info!(
            root = %root.display(),
            files = files.len(),
            languages = ?self.registry.languages(),
            "building index"
        );

        let index = Mutex::new(AstIndex::new());
        files.par_iter().try_for_each(|(path, parser)| {
            let nodes = parser.parse_file(path)?;
            debug!(file = %path.display(), nodes = nodes.len(), "parsed file");

            let mut guard = index.lock().unwrap_or_else(PoisonError::into_inner);
            for node in nodes {
                guard.add_node(node);
            }
            Ok::<(), BuildError>(())
        })?;

        let mut index = index.into_inner().unwrap_or_else(PoisonError::into_inner);
        resolve_class_hierarchy(&mut index);

        info!(root = %root.display(), nodes = index.len(), "index built");
        Ok(index)
    }

    /// Every regular file with a registered adapter, sorted by path.
    fn collect_files(&self, root: &Path) -> Result<Vec<(PathBuf, Arc<dyn Parser>)>, BuildError> {
        let walker = WalkBuilder::new(root).standard_filters(false).build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| BuildError::Walk {
                path: root.to_path_buf(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if let Some(parser) = self.registry.parser_for_path(entry.path()) {
                files.push((entry.into_path(), parser));
            }
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

impl Default for ParserManager {
    fn default() -> Self {
        Self::new()
    }
}
