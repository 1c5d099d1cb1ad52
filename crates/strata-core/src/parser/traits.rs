//! Core adapter trait for turning one source file into AST nodes.

use std::fs;
use std::path::Path;

use super::error::ParseError;
use crate::ast::{AstNode, Language};

/// Language adapter.
///
/// Each implementation turns a single file into an ordered sequence of
/// nodes. Adapters are stateless and never talk to each other, so one
/// instance may be shared across worker threads.
pub trait Parser: Send + Sync {
    /// Parse already-loaded source.
    ///
    /// # Arguments
    /// * `path` - Path recorded on every emitted node and used in node ids
    /// * `content` - Source code content
    fn parse_source(&self, path: &str, content: &str) -> Result<Vec<AstNode>, ParseError>;

    /// Language tag of the emitted nodes.
    fn language(&self) -> Language;

    /// File extensions this adapter handles.
    fn supported_extensions(&self) -> &[&'static str];

    /// Check if this adapter can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Read and parse a file from disk.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; only unreadable files
    /// fail here.
    fn parse_file(&self, path: &Path) -> Result<Vec<AstNode>, ParseError> {
        let bytes = fs::read(path).map_err(|e| ParseError::io(path, e))?;
        let content = String::from_utf8_lossy(&bytes);
        self.parse_source(&path.to_string_lossy(), &content)
    }
}
