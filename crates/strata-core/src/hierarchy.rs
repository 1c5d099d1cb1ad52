//! Transitive class hierarchy resolution.
//!
//! Runs once after a full build. Lookup tables are built from the index
//! first, results are computed into a separate map, and only then written
//! back, so the index is never mutated while it is being read.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info};

use crate::ast::{AstIndex, ClassRef, NodeKind};

struct ClassEntry {
    id: String,
    fqn: String,
    declared: Vec<ClassRef>,
}

struct Tables<'a> {
    /// Fully-qualified name to class entry.
    by_fqn: HashMap<&'a str, &'a ClassEntry>,
    /// Parent name to the names of its direct, indexed children.
    children: HashMap<String, Vec<&'a str>>,
}

/// Fill `super_classes` and `sub_classes` on every class node.
///
/// Super types that are not indexed are kept as leaves and never followed.
/// Sub types only come from indexed code. A per-class visited set, seeded
/// with the class itself, makes cycles terminate and removes duplicates.
pub fn resolve_class_hierarchy(index: &mut AstIndex) {
    let mut entries: Vec<ClassEntry> = index
        .iter()
        .filter(|n| n.kind == NodeKind::Class)
        .map(|n| ClassEntry {
            id: n.id.clone(),
            fqn: n.full_class_name.clone(),
            declared: n.declared_super_classes.clone(),
        })
        .collect();
    if entries.is_empty() {
        return;
    }
    entries.sort_by(|a, b| a.id.cmp(&b.id));

    let tables = build_tables(&entries);

    let mut resolved: BTreeMap<&str, (Vec<ClassRef>, Vec<ClassRef>)> = BTreeMap::new();
    let mut edges = 0usize;
    for entry in &entries {
        let mut visited = HashSet::from([entry.fqn.clone()]);
        let mut supers = Vec::new();
        collect_supers(&tables, &entry.declared, &mut visited, &mut supers);

        let mut visited = HashSet::from([entry.fqn.clone()]);
        let mut subs = Vec::new();
        collect_subs(&tables, &entry.fqn, &mut visited, &mut subs);

        debug!(class = %entry.fqn, supers = supers.len(), subs = subs.len(), "resolved class");
        edges += supers.len();
        resolved.insert(entry.id.as_str(), (supers, subs));
    }

    for (id, (supers, subs)) in resolved {
        if let Some(node) = index.get_node_mut(id) {
            node.super_classes = supers;
            node.sub_classes = subs;
        }
    }

    info!(classes = entries.len(), edges, "class hierarchy resolved");
}

fn build_tables(entries: &[ClassEntry]) -> Tables<'_> {
    let mut by_fqn: HashMap<&str, &ClassEntry> = HashMap::new();
    for entry in entries {
        // First id in sorted order wins when two files declare the same name.
        by_fqn.entry(entry.fqn.as_str()).or_insert(entry);
    }

    let mut children: HashMap<String, Vec<&str>> = HashMap::new();
    for entry in entries {
        for parent in &entry.declared {
            if let Some(target) = lookup(&by_fqn, &parent.qualified()) {
                children.entry(target.fqn.clone()).or_default().push(entry.fqn.as_str());
            }
        }
    }

    Tables { by_fqn, children }
}

/// Find an indexed class by qualified name.
///
/// On a miss the trailing `.` separators are rewritten to `$` one at a time
/// from the right, so an imported `p.Outer.Inner` finds `p.Outer$Inner`.
fn lookup<'a>(by_fqn: &HashMap<&'a str, &'a ClassEntry>, name: &str) -> Option<&'a ClassEntry> {
    if let Some(entry) = by_fqn.get(name) {
        return Some(*entry);
    }
    let mut candidate = name.to_string();
    while let Some(dot) = candidate.rfind('.') {
        candidate.replace_range(dot..=dot, "$");
        if let Some(entry) = by_fqn.get(candidate.as_str()) {
            return Some(*entry);
        }
    }
    None
}

fn collect_supers(
    tables: &Tables,
    declared: &[ClassRef],
    visited: &mut HashSet<String>,
    out: &mut Vec<ClassRef>,
) {
    for parent in declared {
        // Indexed supers are reported under their indexed name.
        let entry = lookup(&tables.by_fqn, &parent.qualified());
        let (name, class_ref) = match entry {
            Some(entry) => (entry.fqn.clone(), ClassRef::from_qualified(&entry.fqn)),
            None => (parent.qualified(), parent.clone()),
        };
        if !visited.insert(name) {
            continue;
        }
        out.push(class_ref);
        if let Some(entry) = entry {
            collect_supers(tables, &entry.declared, visited, out);
        }
    }
}

fn collect_subs(tables: &Tables, name: &str, visited: &mut HashSet<String>, out: &mut Vec<ClassRef>) {
    let Some(children) = tables.children.get(name) else {
        return;
    };
    for child in children {
        if visited.insert((*child).to_string()) {
            out.push(ClassRef::from_qualified(child));
            collect_subs(tables, child, visited, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, Language};

    fn class(index: &mut AstIndex, name: &str, supers: &[&str]) {
        let mut node = AstNode::new(
            format!("A.java:{name}:0"),
            Language::Java,
            NodeKind::Class,
            name,
            "A.java",
        )
        .with_package("p");
        node.declared_super_classes = supers.iter().map(|s| ClassRef::from_qualified(s)).collect();
        index.add_node(node);
    }

    fn supers_of(index: &AstIndex, name: &str) -> Vec<String> {
        let node = index.find_nodes(|n| n.name == name)[0];
        node.super_classes.iter().map(ClassRef::qualified).collect()
    }

    fn subs_of(index: &AstIndex, name: &str) -> Vec<String> {
        let node = index.find_nodes(|n| n.name == name)[0];
        let mut subs: Vec<String> = node.sub_classes.iter().map(ClassRef::qualified).collect();
        subs.sort();
        subs
    }

    #[test]
    fn test_transitive_chain() {
        let mut index = AstIndex::new();
        class(&mut index, "A", &["p.B"]);
        class(&mut index, "B", &["p.C"]);
        class(&mut index, "C", &[]);
        resolve_class_hierarchy(&mut index);

        assert_eq!(supers_of(&index, "A"), vec!["p.B", "p.C"]);
        assert_eq!(subs_of(&index, "C"), vec!["p.A", "p.B"]);
        assert!(supers_of(&index, "C").is_empty());
    }

    #[test]
    fn test_diamond_has_no_duplicates() {
        let mut index = AstIndex::new();
        class(&mut index, "A", &[]);
        class(&mut index, "B", &["p.A"]);
        class(&mut index, "C", &["p.A"]);
        class(&mut index, "D", &["p.B", "p.C"]);
        resolve_class_hierarchy(&mut index);

        assert_eq!(subs_of(&index, "A"), vec!["p.B", "p.C", "p.D"]);
        assert_eq!(supers_of(&index, "D"), vec!["p.B", "p.A", "p.C"]);
    }

    #[test]
    fn test_external_supers_are_leaves() {
        let mut index = AstIndex::new();
        class(&mut index, "Local", &["java.util.AbstractList", "p.Base"]);
        class(&mut index, "Base", &["java.io.Serializable"]);
        resolve_class_hierarchy(&mut index);

        assert_eq!(
            supers_of(&index, "Local"),
            vec!["java.util.AbstractList", "p.Base", "java.io.Serializable"]
        );
        assert!(index
            .find_nodes(|n| n.full_class_name == "java.util.AbstractList")
            .is_empty());
    }

    #[test]
    fn test_dotted_nested_super_finds_indexed_class() {
        let mut index = AstIndex::new();
        class(&mut index, "Outer$Inner", &["p.Base"]);
        class(&mut index, "Base", &[]);
        class(&mut index, "Sub", &["p.Outer.Inner"]);
        resolve_class_hierarchy(&mut index);

        assert_eq!(supers_of(&index, "Sub"), vec!["p.Outer$Inner", "p.Base"]);
        assert_eq!(subs_of(&index, "Inner"), vec!["p.Sub"]);
        assert_eq!(subs_of(&index, "Base"), vec!["p.Outer$Inner", "p.Sub"]);
    }

    #[test]
    fn test_cycle_terminates_without_self_reference() {
        let mut index = AstIndex::new();
        class(&mut index, "X", &["p.Y"]);
        class(&mut index, "Y", &["p.X"]);
        resolve_class_hierarchy(&mut index);

        assert_eq!(supers_of(&index, "X"), vec!["p.Y"]);
        assert_eq!(subs_of(&index, "X"), vec!["p.Y"]);
    }

    #[test]
    fn test_self_extension_is_ignored() {
        let mut index = AstIndex::new();
        class(&mut index, "S", &["p.S"]);
        resolve_class_hierarchy(&mut index);

        assert!(supers_of(&index, "S").is_empty());
        assert!(subs_of(&index, "S").is_empty());
    }
}
