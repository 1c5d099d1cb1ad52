use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting or loading an index snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No cache snapshot at {}", path.display())]
    CacheMiss { path: PathBuf },

    #[error("Corrupt cache snapshot at {}: {source}", path.display())]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
