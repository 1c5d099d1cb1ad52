//! Class, method and field search returning source snippets.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use super::error::QueryError;
use super::matching::{ClassSpecifier, MethodSignature};
use super::{read_lines, sort_by_location, QueryEngine};
use crate::ast::{AstIndex, AstNode, FieldInfo, NodeKind};
use crate::config::{SearchConfig, DEFAULT_CLASS_CONTEXT_LINES, DEFAULT_MEMBER_CONTEXT_LINES};

/// What to look for inside the matched classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    Class,
    Method(MethodSignature),
    Field(String),
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    class: ClassSpecifier,
    target: SearchTarget,
}

impl SearchRequest {
    /// Validate raw arguments. Empty strings count as absent.
    ///
    /// The class name is required and at most one of method and field may
    /// be given.
    pub fn new(class_name: &str, method_name: Option<&str>, field_name: Option<&str>) -> Result<Self, QueryError> {
        let class_name = class_name.trim();
        if class_name.is_empty() {
            return Err(QueryError::invalid("className is required"));
        }

        let method_name = method_name.map(str::trim).filter(|m| !m.is_empty());
        let field_name = field_name.map(str::trim).filter(|f| !f.is_empty());

        let target = match (method_name, field_name) {
            (Some(_), Some(_)) => {
                return Err(QueryError::invalid(
                    "methodName and fieldName cannot both be set",
                ))
            }
            (Some(method), None) => SearchTarget::Method(MethodSignature::parse(method)),
            (None, Some(field)) => SearchTarget::Field(field.to_string()),
            (None, None) => SearchTarget::Class,
        };

        Ok(Self {
            class: ClassSpecifier::parse(class_name),
            target,
        })
    }

    pub fn class(&self) -> &ClassSpecifier {
        &self.class
    }

    pub fn target(&self) -> &SearchTarget {
        &self.target
    }
}

/// Snippet context windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub class_context_lines: usize,
    pub member_context_lines: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            class_context_lines: DEFAULT_CLASS_CONTEXT_LINES,
            member_context_lines: DEFAULT_MEMBER_CONTEXT_LINES,
        }
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            class_context_lines: config.class_context_lines,
            member_context_lines: config.member_context_lines,
        }
    }
}

/// Search layer over a borrowed index.
///
/// Results are ordered by file then line. Snippets whose source can no
/// longer be read are logged and skipped.
pub struct Searcher<'a> {
    engine: QueryEngine<'a>,
    options: SearchOptions,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a AstIndex) -> Self {
        Self::with_options(index, SearchOptions::default())
    }

    pub fn with_options(index: &'a AstIndex, options: SearchOptions) -> Self {
        Self {
            engine: QueryEngine::new(index),
            options,
        }
    }

    /// Dispatch a request. Methods with a parameter list use the
    /// nested-scope search.
    pub fn search(&self, request: &SearchRequest) -> Vec<String> {
        let class = request.class();
        match request.target() {
            SearchTarget::Class => self.search_class(class),
            SearchTarget::Method(sig) if sig.param_types.is_none() => self.search_class_method(class, sig),
            target @ SearchTarget::Method(_) => self.search_in_class_scope(class, target),
            SearchTarget::Field(field) => self.search_class_field(class, field),
        }
    }

    /// One snippet per matching class, with the wide context window.
    pub fn search_class(&self, class: &ClassSpecifier) -> Vec<String> {
        self.matching_classes(class, false)
            .into_iter()
            .filter_map(|node| self.snippet(node, self.options.class_context_lines))
            .collect()
    }

    /// Methods inside the line range of each matching class.
    pub fn search_class_method(&self, class: &ClassSpecifier, sig: &MethodSignature) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut methods = Vec::new();
        for class_node in self.matching_classes(class, false) {
            for method in self.methods_in(class_node, sig) {
                if seen.insert(method.id.as_str()) {
                    methods.push(method);
                }
            }
        }
        sort_by_location(&mut methods);

        methods
            .into_iter()
            .filter_map(|m| self.snippet(m, self.options.member_context_lines))
            .collect()
    }

    /// Fields named `field` declared directly in each matching class.
    ///
    /// Falls back to a simple-name class match when the specifier matches
    /// nothing. Identical snippets are reported once.
    pub fn search_class_field(&self, class: &ClassSpecifier, field: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for class_node in self.matching_classes(class, true) {
            for info in class_node.fields.iter().filter(|f| f.name == field) {
                if let Some(result) = self.field_snippet(class_node, info) {
                    if seen.insert(result.clone()) {
                        results.push(result);
                    }
                }
            }
        }
        results
    }

    /// Like the method and field searches, but also descends into classes
    /// nested strictly inside each matched class.
    pub fn search_in_class_scope(&self, class: &ClassSpecifier, target: &SearchTarget) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for class_node in self.matching_classes(class, true) {
            self.collect_in_scope(class_node, target, &mut visited, &mut seen, &mut results);
        }
        results
    }

    fn collect_in_scope(
        &self,
        class_node: &'a AstNode,
        target: &SearchTarget,
        visited: &mut HashSet<&'a str>,
        seen: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) {
        if !visited.insert(class_node.id.as_str()) {
            return;
        }

        match target {
            SearchTarget::Method(sig) => {
                let mut methods = self.methods_in(class_node, sig);
                sort_by_location(&mut methods);
                for method in methods {
                    if seen.insert(method.id.clone()) {
                        if let Some(snippet) = self.snippet(method, self.options.member_context_lines) {
                            out.push(snippet);
                        }
                    }
                }
            }
            SearchTarget::Field(field) => {
                for info in class_node.fields.iter().filter(|f| f.name == *field) {
                    if let Some(result) = self.field_snippet(class_node, info) {
                        if seen.insert(result.clone()) {
                            out.push(result);
                        }
                    }
                }
            }
            SearchTarget::Class => {}
        }

        let mut nested = self
            .engine
            .index()
            .find_nodes(|n| n.kind == NodeKind::Class && class_node.strictly_contains(n));
        sort_by_location(&mut nested);
        for inner in nested {
            self.collect_in_scope(inner, target, visited, seen, out);
        }
    }

    fn matching_classes(&self, class: &ClassSpecifier, simple_fallback: bool) -> Vec<&'a AstNode> {
        let index = self.engine.index();
        let mut classes = index.find_nodes(|n| class.matches(n));
        if classes.is_empty() && simple_fallback {
            debug!(class = class.raw(), "no exact class match, falling back to simple name");
            classes = index.find_nodes(|n| class.matches_simple_name(n));
        }
        sort_by_location(&mut classes);
        classes
    }

    fn methods_in(&self, class_node: &AstNode, sig: &MethodSignature) -> Vec<&'a AstNode> {
        self.engine
            .index()
            .find_nodes(|n| n.kind == NodeKind::Method && class_node.contains(n) && sig.matches(n))
    }

    fn snippet(&self, node: &AstNode, context_lines: usize) -> Option<String> {
        match self.engine.get_code_snippet(node, context_lines) {
            Ok(snippet) => Some(snippet),
            Err(e) => {
                warn!(node = %node.id, error = %e, "skipping snippet");
                None
            }
        }
    }

    fn field_snippet(&self, class_node: &AstNode, field: &FieldInfo) -> Option<String> {
        let path = Path::new(&class_node.file);
        match read_lines(path, field.start_line, field.end_line, self.options.member_context_lines) {
            Ok(snippet) => Some(format!(
                "Field: {} (Type: {})\n{}",
                field.name, field.field_type, snippet
            )),
            Err(e) => {
                warn!(class = %class_node.id, field = %field.name, error = %e, "skipping field snippet");
                None
            }
        }
    }
}

/// Validate raw arguments and search. Invalid arguments are rejected
/// before the index is consulted.
pub fn unified_search(
    index: &AstIndex,
    class_name: &str,
    method_name: Option<&str>,
    field_name: Option<&str>,
    options: SearchOptions,
) -> Result<Vec<String>, QueryError> {
    let request = SearchRequest::new(class_name, method_name, field_name)?;
    Ok(Searcher::with_options(index, options).search(&request))
}

/// Numbered result blocks for display.
pub fn format_search_results(results: &[String]) -> String {
    if results.is_empty() {
        return "No matching results".to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, result)| format!("==== Result {} ====\n{}\n", i + 1, result))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(matches!(
            SearchRequest::new("", None, None),
            Err(QueryError::InvalidQuery(_))
        ));
        assert!(matches!(
            SearchRequest::new("A", Some("m"), Some("f")),
            Err(QueryError::InvalidQuery(_))
        ));

        let request = SearchRequest::new("A", Some(""), Some("  ")).unwrap();
        assert_eq!(request.target(), &SearchTarget::Class);

        let request = SearchRequest::new("A", Some("run(String s)"), None).unwrap();
        assert!(matches!(request.target(), SearchTarget::Method(sig) if sig.name == "run"));
    }

    #[test]
    fn test_invalid_request_never_touches_index() {
        let index = AstIndex::new();
        let err = unified_search(&index, "A", Some("m"), Some("f"), SearchOptions::default()).unwrap_err();
        assert!(err.to_string().contains("cannot both be set"));
    }

    #[test]
    fn test_format_results() {
        assert_eq!(format_search_results(&[]), "No matching results");
        let text = format_search_results(&["a".to_string(), "b".to_string()]);
        assert_eq!(text, "==== Result 1 ====\na\n\n==== Result 2 ====\nb\n");
    }
}
