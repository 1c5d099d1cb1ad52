use std::path::PathBuf;
use thiserror::Error;

/// Errors scoped to a single query or search call.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Source unavailable for {}: {message}", path.display())]
    SourceUnavailable { path: PathBuf, message: String },
}

impl QueryError {
    pub fn invalid(message: impl Into<String>) -> Self {
        QueryError::InvalidQuery(message.into())
    }

    pub fn source_unavailable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        QueryError::SourceUnavailable {
            path: path.into(),
            message: message.into(),
        }
    }
}
