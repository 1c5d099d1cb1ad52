//! Registry of language adapters.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::go::GoParser;
use super::java::JavaParser;
use super::traits::Parser;
use crate::ast::Language;

/// Maps a language tag to the adapter that parses it.
///
/// Files are classified by the fixed extension table on [`Language`];
/// a recognized language without a registered adapter is skipped.
pub struct ParserRegistry {
    parsers: HashMap<Language, Arc<dyn Parser>>,
}

impl ParserRegistry {
    /// Create a registry with the built-in Go and Java adapters.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(GoParser::new()));
        registry.register(Arc::new(JavaParser::new()));
        registry
    }

    /// Create a registry with no adapters.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register an adapter, replacing any previous one for its language.
    pub fn register(&mut self, parser: Arc<dyn Parser>) {
        self.parsers.insert(parser.language(), parser);
    }

    pub fn parser_for(&self, language: Language) -> Option<Arc<dyn Parser>> {
        self.parsers.get(&language).cloned()
    }

    /// Get an adapter for the given file path.
    ///
    /// The adapter registered for the path's language must also accept the
    /// file's extension.
    pub fn parser_for_path(&self, path: &Path) -> Option<Arc<dyn Parser>> {
        let parser = self.parser_for(Language::from_path(path)?)?;
        let extension = path.extension()?.to_str()?;
        parser.can_parse(extension).then_some(parser)
    }

    /// Registered languages, sorted.
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.parsers.keys().copied().collect();
        languages.sort();
        languages
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
