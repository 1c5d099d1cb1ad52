//! Read-only queries over an [`AstIndex`].
//!
//! ## Components
//!
//! - `QueryEngine` - Typed accessors, hierarchy lookups and snippet reads
//! - `Searcher` - Class, method and field search built on the engine
//! - `ClassSpecifier` / `MethodSignature` - Name and signature matching

mod error;
mod matching;
mod search;

pub use error::QueryError;
pub use matching::{ClassSpecifier, MethodSignature};
pub use search::{format_search_results, unified_search, SearchOptions, SearchRequest, SearchTarget, Searcher};

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::ast::{AstIndex, AstNode, ClassRef, Language, NodeKind};

/// Conjunctive node filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeQuery {
    pub kind: Option<NodeKind>,
    pub name: Option<String>,
    pub package: Option<String>,
    pub language: Option<Language>,
}

impl NodeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn matches(&self, node: &AstNode) -> bool {
        self.kind.map_or(true, |k| node.kind == k)
            && self.name.as_ref().map_or(true, |n| node.name == *n)
            && self.package.as_ref().map_or(true, |p| node.package == *p)
            && self.language.map_or(true, |l| node.language == l)
    }
}

/// Accessors over a borrowed index.
#[derive(Clone, Copy)]
pub struct QueryEngine<'a> {
    index: &'a AstIndex,
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a AstIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a AstIndex {
        self.index
    }

    /// Nodes matching `query`, sorted by file then start line.
    pub fn query(&self, query: &NodeQuery) -> Vec<&'a AstNode> {
        let mut nodes = self.index.find_nodes(|n| query.matches(n));
        sort_by_location(&mut nodes);
        nodes
    }

    pub fn all_nodes(&self) -> Vec<&'a AstNode> {
        self.query(&NodeQuery::new())
    }

    pub fn find_by_kind(&self, kind: NodeKind) -> Vec<&'a AstNode> {
        self.query(&NodeQuery::new().kind(kind))
    }

    pub fn find_by_name(&self, name: &str) -> Vec<&'a AstNode> {
        self.query(&NodeQuery::new().name(name))
    }

    pub fn find_by_package(&self, package: &str) -> Vec<&'a AstNode> {
        self.query(&NodeQuery::new().package(package))
    }

    pub fn find_by_language(&self, language: Language) -> Vec<&'a AstNode> {
        self.query(&NodeQuery::new().language(language))
    }

    /// Transitive super types of every class whose full or simple name is
    /// `class_name`, merged without duplicates.
    pub fn super_classes(&self, class_name: &str) -> Vec<ClassRef> {
        self.merge_class_refs(class_name, |n| &n.super_classes)
    }

    /// Transitive sub types of every class whose full or simple name is
    /// `class_name`, merged without duplicates.
    pub fn sub_classes(&self, class_name: &str) -> Vec<ClassRef> {
        self.merge_class_refs(class_name, |n| &n.sub_classes)
    }

    fn merge_class_refs<F>(&self, class_name: &str, refs: F) -> Vec<ClassRef>
    where
        F: Fn(&'a AstNode) -> &'a Vec<ClassRef>,
    {
        let mut classes = self.index.find_nodes(|n| {
            n.kind == NodeKind::Class && (n.full_class_name == class_name || n.name == class_name)
        });
        sort_by_location(&mut classes);

        let mut seen = HashSet::new();
        classes
            .into_iter()
            .flat_map(refs)
            .filter(|r| seen.insert((*r).clone()))
            .cloned()
            .collect()
    }

    /// Source text of `node` with `context_lines` of surrounding context.
    pub fn get_code_snippet(&self, node: &AstNode, context_lines: usize) -> Result<String, QueryError> {
        read_lines(Path::new(&node.file), node.start_line, node.end_line, context_lines)
    }
}

/// Inclusive line range `[max(1, start - context), end + context]` of a file.
///
/// Fails when the file cannot be read or the range is past its end.
pub fn read_lines(path: &Path, start: u32, end: u32, context_lines: usize) -> Result<String, QueryError> {
    let context = u32::try_from(context_lines).unwrap_or(u32::MAX);
    let first = start.saturating_sub(context).max(1);
    let last = end.saturating_add(context);

    let file = File::open(path).map_err(|e| QueryError::source_unavailable(path, e.to_string()))?;
    let mut reader = BufReader::new(file);

    let mut lines = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0u32;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| QueryError::source_unavailable(path, e.to_string()))?;
        if read == 0 {
            break;
        }
        line_no += 1;
        if line_no < first {
            continue;
        }
        if line_no > last {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        lines.push(text.trim_end_matches(['\n', '\r']).to_string());
    }

    if lines.is_empty() {
        return Err(QueryError::source_unavailable(
            path,
            format!("no lines in range {first}-{last}"),
        ));
    }
    Ok(lines.join("\n"))
}

pub(crate) fn sort_by_location(nodes: &mut [&AstNode]) {
    nodes.sort_by(|a, b| {
        (a.file.as_str(), a.start_line, a.id.as_str()).cmp(&(b.file.as_str(), b.start_line, b.id.as_str()))
    });
}
