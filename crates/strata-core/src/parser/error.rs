use std::path::PathBuf;
use thiserror::Error;

/// A single file could not be read or parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Syntax { path: String, message: String },
}

impl ParseError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParseError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn syntax(path: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Building an index from a directory failed. No partial index is returned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
