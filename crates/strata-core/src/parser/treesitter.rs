//! Tree-sitter based parsing utilities shared across language adapters.

use tree_sitter::{Language, Node, Parser as TSParser, Point, Tree};

use super::error::ParseError;

/// Base tree-sitter parser with shared functionality.
pub struct TreeSitterParser {
    language: Language,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Parse source code into a tree-sitter tree.
    ///
    /// A fresh `tree_sitter::Parser` is created per call so the adapter can be
    /// shared across threads.
    pub fn parse_tree(&self, path: &str, content: &str) -> Result<Tree, ParseError> {
        let mut parser = TSParser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::syntax(path, format!("failed to set language: {e}")))?;

        parser
            .parse(content, None)
            .ok_or_else(|| ParseError::syntax(path, "parser produced no tree"))
    }

    /// Get text for a node from source content.
    pub fn node_text<'a>(node: &Node, content: &'a str) -> &'a str {
        &content[node.byte_range()]
    }

    /// Get line number (1-based) for a node.
    pub fn node_line(node: &Node) -> u32 {
        node.start_position().row as u32 + 1
    }

    /// Get end line number (1-based) for a node.
    pub fn node_end_line(node: &Node) -> u32 {
        node.end_position().row as u32 + 1
    }

    /// Find all direct children of a specific kind.
    pub fn children_of_kind<'a>(node: &Node<'a>, kind: &str) -> Vec<Node<'a>> {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|n| n.kind() == kind)
            .collect()
    }

    /// Position of the first error or missing node, in document order.
    pub fn first_error(node: &Node) -> Option<Point> {
        if !node.has_error() {
            return None;
        }
        if node.is_error() || node.is_missing() {
            return Some(node.start_position());
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        children
            .iter()
            .find_map(Self::first_error)
            .or(Some(node.start_position()))
    }
}
