//! In-memory node store.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::{AstNode, Language, NodeKind, INNER_CLASS_SEPARATOR};

/// Keyed store of every node extracted from one repository snapshot.
///
/// Built once, enriched by the hierarchy resolver, then read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AstIndex {
    nodes: HashMap<String, AstNode>,
}

impl AstIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an index from already-normalized nodes, e.g. a cache snapshot.
    ///
    /// Nodes are stored verbatim: class names are not re-split.
    pub fn from_nodes(nodes: impl IntoIterator<Item = (String, AstNode)>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    /// Insert a node, computing the class-only name fields.
    ///
    /// For classes the fully-qualified name is `package.rawName` (or the raw
    /// name when the package is empty). A raw name containing `$` is split on
    /// the last separator: the prefix becomes the enclosing class and the
    /// suffix the simple name. A node with an existing id is replaced.
    pub fn add_node(&mut self, mut node: AstNode) {
        if node.kind == NodeKind::Class {
            node.full_class_name = if node.package.is_empty() {
                node.name.clone()
            } else {
                format!("{}.{}", node.package, node.name)
            };

            let split = node
                .name
                .rsplit_once(INNER_CLASS_SEPARATOR)
                .map(|(outer, simple)| (outer.to_string(), simple.to_string()));
            match split {
                Some((outer, simple)) => {
                    node.is_inner_class = true;
                    node.outer_class = outer;
                    node.name = simple;
                }
                None => {
                    node.is_inner_class = false;
                    node.outer_class.clear();
                }
            }
        }

        self.nodes.insert(node.id.clone(), node);
    }

    pub fn get_node(&self, id: &str) -> Option<&AstNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_node_mut(&mut self, id: &str) -> Option<&mut AstNode> {
        self.nodes.get_mut(id)
    }

    /// All nodes satisfying `predicate`, in no particular order.
    pub fn find_nodes<F>(&self, predicate: F) -> Vec<&AstNode>
    where
        F: Fn(&AstNode) -> bool,
    {
        self.nodes.values().filter(|n| predicate(n)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AstNode> {
        self.nodes.values()
    }

    pub fn nodes(&self) -> &HashMap<String, AstNode> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node counts grouped by kind and by language.
    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            total: self.nodes.len(),
            ..IndexStats::default()
        };
        for node in self.nodes.values() {
            *stats.by_kind.entry(node.kind).or_default() += 1;
            *stats.by_language.entry(node.language).or_default() += 1;
        }
        stats
    }
}

/// Summary counts over an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total: usize,
    pub by_kind: BTreeMap<NodeKind, usize>,
    pub by_language: BTreeMap<Language, usize>,
}
