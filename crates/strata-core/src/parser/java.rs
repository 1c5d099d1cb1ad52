//! Java adapter using tree-sitter.
//!
//! Emits one `Class` node per class, interface, annotation, enum or record
//! declaration, one `Method` node per method, constructor or annotation
//! element, and one unresolved `MethodCall` node per invocation. Nested
//! classes are named `Outer$Inner` so the index can split them.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;
use tree_sitter::Node;

use super::error::ParseError;
use super::traits::Parser;
use super::treesitter::TreeSitterParser;
use crate::ast::{AstNode, ClassRef, FieldInfo, Language, NodeKind, INNER_CLASS_SEPARATOR};
use crate::config::DEFAULT_JAVA_PACKAGE;

const CLASS_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "annotation_type_declaration",
    "enum_declaration",
    "record_declaration",
];

const METHOD_KINDS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "compact_constructor_declaration",
    "annotation_type_element_declaration",
];

/// Java adapter using tree-sitter.
pub struct JavaParser {
    base: TreeSitterParser,
}

/// Simple-name to qualified-name table built from a file's imports.
#[derive(Debug, Default)]
struct ImportTable {
    explicit: HashMap<String, String>,
    wildcard: Vec<String>,
}

impl ImportTable {
    fn from_root(root: &Node, content: &str) -> Self {
        let mut table = Self::default();

        for import in TreeSitterParser::children_of_kind(root, "import_declaration") {
            let mut cursor = import.walk();
            let children: Vec<Node> = import.children(&mut cursor).collect();

            // Static imports bring in members, not types.
            if children.iter().any(|c| c.kind() == "static") {
                continue;
            }
            let Some(name_node) = children
                .iter()
                .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
            else {
                continue;
            };
            let name = TreeSitterParser::node_text(name_node, content).to_string();

            if children.iter().any(|c| c.kind() == "asterisk") {
                table.wildcard.push(name);
            } else if let Some((_, simple)) = name.rsplit_once('.') {
                table.explicit.insert(simple.to_string(), name.clone());
            }
        }

        table
    }

    /// Qualify a raw super-type name that is not a class of this file.
    ///
    /// Priority: explicit import, first wildcard package, current package,
    /// bare name. A dotted name is qualified through its first segment:
    /// `Outer.Inner` follows an import of `Outer`, a capitalized head is a
    /// type in the current package, anything else is a package path.
    fn qualify(&self, raw: &str, package: &str) -> String {
        if let Some((head, rest)) = raw.split_once('.') {
            if let Some(qualified) = self.explicit.get(head) {
                return format!("{qualified}.{rest}");
            }
            if head.starts_with(char::is_uppercase) && !package.is_empty() {
                return format!("{package}.{raw}");
            }
            return raw.to_string();
        }
        if let Some(qualified) = self.explicit.get(raw) {
            return qualified.clone();
        }
        if let Some(first) = self.wildcard.first() {
            if self.wildcard.len() > 1 {
                debug!(name = raw, candidates = ?self.wildcard, "ambiguous wildcard import, using first");
            }
            return format!("{first}.{raw}");
        }
        if !package.is_empty() {
            return format!("{package}.{raw}");
        }
        raw.to_string()
    }
}

struct FileContext<'a> {
    path: &'a str,
    content: &'a str,
    package: String,
    imports: ImportTable,
    /// Raw names (`Outer$Inner`) of every class declared in the file.
    local_classes: HashSet<String>,
}

impl FileContext<'_> {
    /// Qualify a super-type name written inside the classes in `scope`.
    ///
    /// Member classes shadow imports: the first segment is looked up from the
    /// innermost enclosing class outwards, then among the file's top-level
    /// classes. A local hit yields the indexed `pkg.Outer$Inner` form.
    fn qualify_super(&self, raw: &str, scope: &[String]) -> String {
        let (head, rest) = match raw.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (raw, None),
        };

        let Some(mut local) = self.local_class(head, scope) else {
            return self.imports.qualify(raw, &self.package);
        };
        for segment in rest.into_iter().flat_map(|r| r.split('.')) {
            local.push(INNER_CLASS_SEPARATOR);
            local.push_str(segment);
        }
        if self.package.is_empty() {
            local
        } else {
            format!("{}.{}", self.package, local)
        }
    }

    fn local_class(&self, simple: &str, scope: &[String]) -> Option<String> {
        scope
            .iter()
            .rev()
            .map(|outer| format!("{outer}{INNER_CLASS_SEPARATOR}{simple}"))
            .chain(std::iter::once(simple.to_string()))
            .find(|candidate| self.local_classes.contains(candidate))
    }
}

impl JavaParser {
    pub fn new() -> Self {
        Self {
            base: TreeSitterParser::new(tree_sitter_java::LANGUAGE.into()),
        }
    }

    fn package_name(root: &Node, content: &str) -> Option<String> {
        let decl = TreeSitterParser::children_of_kind(root, "package_declaration")
            .into_iter()
            .next()?;
        let mut cursor = decl.walk();
        let name = decl
            .named_children(&mut cursor)
            .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))?;
        Some(TreeSitterParser::node_text(&name, content).to_string())
    }

    /// Raw names of all class declarations, nested ones joined with `$`.
    fn collect_class_names(node: Node, content: &str, scope: &mut Vec<String>, out: &mut HashSet<String>) {
        let mut pushed = false;
        if CLASS_KINDS.contains(&node.kind()) {
            if let Some(name_node) = node.child_by_field_name("name") {
                let simple = TreeSitterParser::node_text(&name_node, content);
                let raw_name = match scope.last() {
                    Some(outer) => format!("{outer}{INNER_CLASS_SEPARATOR}{simple}"),
                    None => simple.to_string(),
                };
                out.insert(raw_name.clone());
                scope.push(raw_name);
                pushed = true;
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            Self::collect_class_names(child, content, scope, out);
        }

        if pushed {
            scope.pop();
        }
    }

    fn visit(&self, node: Node, ctx: &FileContext, scope: &mut Vec<String>, out: &mut Vec<AstNode>) {
        let kind = node.kind();

        if CLASS_KINDS.contains(&kind) {
            if let Some(name_node) = node.child_by_field_name("name") {
                let simple = TreeSitterParser::node_text(&name_node, ctx.content);
                let raw_name = match scope.last() {
                    Some(outer) => format!("{outer}{INNER_CLASS_SEPARATOR}{simple}"),
                    None => simple.to_string(),
                };
                out.push(self.extract_class(&node, simple, &raw_name, scope.as_slice(), ctx));

                scope.push(raw_name);
                self.visit_children(node, ctx, scope, out);
                scope.pop();
                return;
            }
        } else if METHOD_KINDS.contains(&kind) {
            if let Some(method) = self.extract_method(&node, ctx, scope.last()) {
                out.push(method);
            }
        } else if kind == "method_invocation" {
            if let Some(call) = self.extract_call(&node, ctx, scope.last()) {
                out.push(call);
            }
        }

        self.visit_children(node, ctx, scope, out);
    }

    fn visit_children(&self, node: Node, ctx: &FileContext, scope: &mut Vec<String>, out: &mut Vec<AstNode>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, ctx, scope, out);
        }
    }

    fn extract_class(
        &self,
        node: &Node,
        simple: &str,
        raw_name: &str,
        scope: &[String],
        ctx: &FileContext,
    ) -> AstNode {
        let supers: Vec<ClassRef> = Self::super_type_names(node, ctx.content)
            .iter()
            .map(|name| ClassRef::from_qualified(&ctx.qualify_super(name, scope)))
            .collect();
        let joined = supers
            .iter()
            .map(ClassRef::qualified)
            .collect::<Vec<_>>()
            .join(",");

        let mut class = AstNode::new(
            format!("{}:{}:{}", ctx.path, simple, node.start_byte()),
            Language::Java,
            NodeKind::Class,
            raw_name,
            ctx.path,
        )
        .with_package(&ctx.package)
        .with_lines(TreeSitterParser::node_line(node), TreeSitterParser::node_end_line(node))
        .with_metadata("declarationKind", node.kind().trim_end_matches("_declaration"))
        .with_metadata("superClasses", joined);

        class.fields = self.extract_fields(node, ctx.content);
        class.declared_super_classes = supers;
        class
    }

    /// Raw names from `extends`, `implements` and interface `extends` clauses.
    fn super_type_names(node: &Node, content: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(child.kind(), "superclass" | "super_interfaces" | "extends_interfaces") {
                Self::collect_type_names(&child, content, &mut names);
            }
        }
        names
    }

    fn collect_type_names(node: &Node, content: &str, out: &mut Vec<String>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "type_list" => Self::collect_type_names(&child, content, out),
                // Erase type arguments: `Base<T>` qualifies as `Base`.
                "generic_type" => {
                    if let Some(base) = child.named_child(0) {
                        out.push(TreeSitterParser::node_text(&base, content).to_string());
                    }
                }
                "type_identifier" | "scoped_type_identifier" => {
                    out.push(TreeSitterParser::node_text(&child, content).to_string());
                }
                _ => {}
            }
        }
    }

    fn extract_fields(&self, class: &Node, content: &str) -> Vec<FieldInfo> {
        let mut fields = Vec::new();

        // Record components behave as fields.
        if let Some(params) = class.child_by_field_name("parameters") {
            for param in TreeSitterParser::children_of_kind(&params, "formal_parameter") {
                let (Some(type_node), Some(name_node)) =
                    (param.child_by_field_name("type"), param.child_by_field_name("name"))
                else {
                    continue;
                };
                fields.push(Self::field_info(
                    TreeSitterParser::node_text(&name_node, content),
                    TreeSitterParser::node_text(&type_node, content),
                    &param,
                    Self::modifiers(&param, content),
                ));
            }
        }

        if let Some(body) = class.child_by_field_name("body") {
            Self::collect_body_fields(&body, content, &mut fields);
        }

        fields
    }

    fn collect_body_fields(body: &Node, content: &str, out: &mut Vec<FieldInfo>) {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    Self::push_declared_fields(&member, content, out)
                }
                "enum_body_declarations" => Self::collect_body_fields(&member, content, out),
                _ => {}
            }
        }
    }

    /// One entry per declarator: `int a, b;` yields two fields sharing the
    /// type and modifiers.
    fn push_declared_fields(decl: &Node, content: &str, out: &mut Vec<FieldInfo>) {
        let Some(type_node) = decl.child_by_field_name("type") else {
            return;
        };
        let field_type = TreeSitterParser::node_text(&type_node, content);
        let modifiers = Self::modifiers(decl, content);

        for declarator in TreeSitterParser::children_of_kind(decl, "variable_declarator") {
            if let Some(name_node) = declarator.child_by_field_name("name") {
                out.push(Self::field_info(
                    TreeSitterParser::node_text(&name_node, content),
                    field_type,
                    decl,
                    modifiers.clone(),
                ));
            }
        }
    }

    fn field_info(name: &str, field_type: &str, node: &Node, modifiers: Vec<String>) -> FieldInfo {
        let mut metadata = BTreeMap::new();
        metadata.insert("fullType".to_string(), field_type.to_string());
        FieldInfo {
            name: name.to_string(),
            field_type: field_type.to_string(),
            start_line: TreeSitterParser::node_line(node),
            end_line: TreeSitterParser::node_end_line(node),
            modifiers,
            metadata,
        }
    }

    fn modifiers(node: &Node, content: &str) -> Vec<String> {
        let mut modifiers = Vec::new();
        for group in TreeSitterParser::children_of_kind(node, "modifiers") {
            let mut cursor = group.walk();
            for modifier in group.children(&mut cursor) {
                let text = TreeSitterParser::node_text(&modifier, content);
                if !text.starts_with('@') {
                    modifiers.push(text.to_string());
                }
            }
        }
        modifiers
    }

    fn extract_method(&self, node: &Node, ctx: &FileContext, declaring: Option<&String>) -> Option<AstNode> {
        let name_node = node.child_by_field_name("name")?;
        let name = TreeSitterParser::node_text(&name_node, ctx.content);

        let mut method = AstNode::new(
            format!("{}:{}:{}", ctx.path, name, node.start_byte()),
            Language::Java,
            NodeKind::Method,
            name,
            ctx.path,
        )
        .with_package(&ctx.package)
        .with_lines(TreeSitterParser::node_line(node), TreeSitterParser::node_end_line(node));

        method.method_params = node
            .child_by_field_name("parameters")
            .map(|params| Self::parameter_types(&params, ctx.content))
            .unwrap_or_default();

        if let Some(return_type) = node.child_by_field_name("type") {
            method.metadata.insert(
                "returnType".to_string(),
                TreeSitterParser::node_text(&return_type, ctx.content).to_string(),
            );
        }
        if let Some(class) = declaring {
            method.metadata.insert("declaringClass".to_string(), class.clone());
        }

        Some(method)
    }

    fn parameter_types(params: &Node, content: &str) -> Vec<String> {
        let mut cursor = params.walk();
        params
            .named_children(&mut cursor)
            .filter_map(|param| match param.kind() {
                "formal_parameter" => param
                    .child_by_field_name("type")
                    .map(|t| TreeSitterParser::node_text(&t, content).to_string()),
                "spread_parameter" => Self::spread_type(&param, content).map(|t| format!("{t}...")),
                _ => None,
            })
            .collect()
    }

    fn spread_type(param: &Node, content: &str) -> Option<String> {
        let mut cursor = param.walk();
        let children: Vec<Node> = param.children(&mut cursor).collect();
        children
            .iter()
            .take_while(|c| c.kind() != "...")
            .find(|c| c.is_named() && c.kind() != "modifiers")
            .map(|t| TreeSitterParser::node_text(t, content).to_string())
    }

    fn extract_call(&self, node: &Node, ctx: &FileContext, declaring: Option<&String>) -> Option<AstNode> {
        let name_node = node.child_by_field_name("name")?;
        let name = TreeSitterParser::node_text(&name_node, ctx.content);

        // Keyed on the name's offset: chained calls share the expression start.
        let mut call = AstNode::new(
            format!("{}:{}:{}", ctx.path, name, name_node.start_byte()),
            Language::Java,
            NodeKind::MethodCall,
            name,
            ctx.path,
        )
        .with_package(&ctx.package)
        .with_lines(TreeSitterParser::node_line(node), TreeSitterParser::node_end_line(node));

        if let Some(class) = declaring {
            call.metadata.insert("declaringClass".to_string(), class.clone());
        }
        Some(call)
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for JavaParser {
    fn parse_source(&self, path: &str, content: &str) -> Result<Vec<AstNode>, ParseError> {
        let tree = self.base.parse_tree(path, content)?;
        let root = tree.root_node();

        if let Some(position) = TreeSitterParser::first_error(&root) {
            debug!(file = path, line = position.row + 1, "recovered from Java syntax error");
        }

        let mut local_classes = HashSet::new();
        Self::collect_class_names(root, content, &mut Vec::new(), &mut local_classes);

        let ctx = FileContext {
            path,
            content,
            package: Self::package_name(&root, content)
                .unwrap_or_else(|| DEFAULT_JAVA_PACKAGE.to_string()),
            imports: ImportTable::from_root(&root, content),
            local_classes,
        };

        let mut nodes = Vec::new();
        self.visit(root, &ctx, &mut Vec::new(), &mut nodes);
        Ok(nodes)
    }

    fn language(&self) -> Language {
        Language::Java
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["java"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Vec<AstNode> {
        JavaParser::new().parse_source("Test.java", src).unwrap()
    }

    fn find<'a>(nodes: &'a [AstNode], kind: NodeKind, name: &str) -> &'a AstNode {
        nodes
            .iter()
            .find(|n| n.kind == kind && n.name == name)
            .unwrap_or_else(|| panic!("no {kind} named {name}"))
    }

    #[test]
    fn test_class_with_fields_and_methods() {
        let nodes = parse(
            "package com.acme;\n\
             class Child extends Base {\n\
                 private int x, y;\n\
                 void run(String s) { helper(); }\n\
                 Child(int a, java.util.List<String> b) {}\n\
             }\n",
        );

        let class = find(&nodes, NodeKind::Class, "Child");
        assert_eq!(class.package, "com.acme");
        assert_eq!(class.start_line, 2);
        assert_eq!(class.end_line, 6);
        assert_eq!(class.declared_super_classes, vec![ClassRef::new("com.acme", "Base")]);
        assert_eq!(class.metadata["superClasses"], "com.acme.Base");

        let names: Vec<&str> = class.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert!(class.fields.iter().all(|f| f.field_type == "int"));
        assert_eq!(class.fields[0].modifiers, vec!["private"]);
        assert_eq!(class.fields[0].metadata["fullType"], "int");

        let run = find(&nodes, NodeKind::Method, "run");
        assert_eq!(run.method_params, vec!["String"]);
        assert_eq!(run.metadata["returnType"], "void");
        assert_eq!(run.metadata["declaringClass"], "Child");
        assert_eq!(run.start_line, 4);

        let ctor = find(&nodes, NodeKind::Method, "Child");
        assert_eq!(ctor.method_params, vec!["int", "java.util.List<String>"]);
        assert!(!ctor.metadata.contains_key("returnType"));

        find(&nodes, NodeKind::MethodCall, "helper");
    }

    #[test]
    fn test_default_package_and_no_supers() {
        let nodes = parse("class Plain {}");
        let class = find(&nodes, NodeKind::Class, "Plain");
        assert_eq!(class.package, DEFAULT_JAVA_PACKAGE);
        assert!(class.declared_super_classes.is_empty());
        assert_eq!(class.metadata["superClasses"], "");
    }

    #[test]
    fn test_super_qualification_priority() {
        let nodes = parse(
            "package app;\n\
             import lib.model.Entity;\n\
             import lib.util.*;\n\
             class A extends Entity implements Helper, java.io.Serializable, Comparable<A> {}\n",
        );
        let class = find(&nodes, NodeKind::Class, "A");
        let supers: Vec<String> = class.declared_super_classes.iter().map(ClassRef::qualified).collect();
        assert_eq!(
            supers,
            vec![
                "lib.model.Entity",
                "lib.util.Helper",
                "java.io.Serializable",
                "lib.util.Comparable",
            ]
        );
    }

    #[test]
    fn test_interface_extends_and_enum() {
        let nodes = parse(
            "package p;\n\
             interface Shape extends Named, Sized {}\n\
             enum Color implements Shape { RED; private final int code = 1; int code() { return code; } }\n",
        );
        let shape = find(&nodes, NodeKind::Class, "Shape");
        assert_eq!(
            shape.declared_super_classes,
            vec![ClassRef::new("p", "Named"), ClassRef::new("p", "Sized")]
        );

        let color = find(&nodes, NodeKind::Class, "Color");
        assert_eq!(color.declared_super_classes, vec![ClassRef::new("p", "Shape")]);
        assert_eq!(color.fields.len(), 1);
        assert_eq!(color.fields[0].name, "code");
        assert_eq!(color.metadata["declarationKind"], "enum");
    }

    #[test]
    fn test_nested_classes_use_separator() {
        let nodes = parse(
            "package p;\n\
             class Outer {\n\
                 static class Inner { String label; }\n\
             }\n",
        );
        let inner = nodes.iter().find(|n| n.name == "Outer$Inner").unwrap();
        assert_eq!(inner.kind, NodeKind::Class);
        assert_eq!(inner.fields[0].name, "label");
        assert!(find(&nodes, NodeKind::Class, "Outer").fields.is_empty());
    }

    #[test]
    fn test_first_wildcard_wins_when_ambiguous() {
        let nodes = parse(
            "package app;\n\
             import lib.first.*;\n\
             import lib.second.*;\n\
             class A extends Base {}\n",
        );
        let class = find(&nodes, NodeKind::Class, "A");
        assert_eq!(class.declared_super_classes, vec![ClassRef::new("lib.first", "Base")]);
    }

    #[test]
    fn test_nested_supers_resolve_to_indexed_names() {
        let nodes = parse(
            "package p;\n\
             import q.Api;\n\
             class Outer {\n\
                 static class Inner {}\n\
                 static class Sub extends Inner {}\n\
                 static class Deep { static class Leaf extends Inner {} }\n\
             }\n\
             class Peer extends Outer.Inner implements Api.Callback, Other.Thing, java.io.Serializable {}\n",
        );
        let sub = find(&nodes, NodeKind::Class, "Outer$Sub");
        assert_eq!(sub.declared_super_classes, vec![ClassRef::new("p", "Outer$Inner")]);

        let leaf = find(&nodes, NodeKind::Class, "Outer$Deep$Leaf");
        assert_eq!(leaf.declared_super_classes, vec![ClassRef::new("p", "Outer$Inner")]);

        let peer = find(&nodes, NodeKind::Class, "Peer");
        let supers: Vec<String> = peer.declared_super_classes.iter().map(ClassRef::qualified).collect();
        assert_eq!(
            supers,
            vec!["p.Outer$Inner", "q.Api.Callback", "p.Other.Thing", "java.io.Serializable"]
        );
    }

    #[test]
    fn test_varargs_parameter() {
        let nodes = parse("class V { void log(String fmt, Object... args) {} }");
        let log = find(&nodes, NodeKind::Method, "log");
        assert_eq!(log.method_params, vec!["String", "Object..."]);
    }

    #[test]
    fn test_chained_calls_get_distinct_ids() {
        let nodes = parse("class C { void m() { foo().foo(); } }");
        let calls: Vec<&AstNode> = nodes.iter().filter(|n| n.kind == NodeKind::MethodCall).collect();
        assert_eq!(calls.len(), 2);
        assert_ne!(calls[0].id, calls[1].id);
    }

    #[test]
    fn test_syntax_errors_are_tolerated() {
        let nodes = parse("package p; class Broken { void m() { int x = ; } }");
        assert!(nodes.iter().any(|n| n.kind == NodeKind::Class && n.name == "Broken"));
    }
}
