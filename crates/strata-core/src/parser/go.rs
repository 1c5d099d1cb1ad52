//! Go adapter using tree-sitter.
//!
//! Emits `Function` nodes for functions and methods, `Type` nodes for type
//! declarations and `FunctionCall` nodes for calls whose callee is a bare
//! identifier. Unlike the Java adapter, any syntax error fails the file.

use tree_sitter::Node;

use super::error::ParseError;
use super::traits::Parser;
use super::treesitter::TreeSitterParser;
use crate::ast::{AstNode, Language, NodeKind};

/// Go adapter using tree-sitter.
pub struct GoParser {
    base: TreeSitterParser,
}

struct FileContext<'a> {
    path: &'a str,
    content: &'a str,
    package: String,
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            base: TreeSitterParser::new(tree_sitter_go::LANGUAGE.into()),
        }
    }

    fn package_name(root: &Node, content: &str) -> String {
        TreeSitterParser::children_of_kind(root, "package_clause")
            .into_iter()
            .next()
            .and_then(|clause| {
                TreeSitterParser::children_of_kind(&clause, "package_identifier")
                    .into_iter()
                    .next()
            })
            .map(|name| TreeSitterParser::node_text(&name, content).to_string())
            .unwrap_or_default()
    }

    /// Ids are `path:line:column`, both 1-based.
    fn node_id(path: &str, node: &Node) -> String {
        let position = node.start_position();
        format!("{}:{}:{}", path, position.row + 1, position.column + 1)
    }

    fn new_node(ctx: &FileContext, node: &Node, kind: NodeKind, name: &str) -> AstNode {
        AstNode::new(Self::node_id(ctx.path, node), Language::Go, kind, name, ctx.path)
            .with_package(&ctx.package)
            .with_lines(TreeSitterParser::node_line(node), TreeSitterParser::node_end_line(node))
    }

    fn visit(&self, node: Node, ctx: &FileContext, out: &mut Vec<AstNode>) {
        match node.kind() {
            "function_declaration" | "method_declaration" => {
                if let Some(function) = self.extract_function(&node, ctx) {
                    out.push(function);
                }
            }
            "type_spec" | "type_alias" => {
                if let Some(name) = node.child_by_field_name("name") {
                    let name = TreeSitterParser::node_text(&name, ctx.content);
                    out.push(Self::new_node(ctx, &node, NodeKind::Type, name));
                }
            }
            "call_expression" => {
                if let Some(callee) = node.child_by_field_name("function") {
                    if callee.kind() == "identifier" {
                        let name = TreeSitterParser::node_text(&callee, ctx.content);
                        out.push(Self::new_node(ctx, &node, NodeKind::FunctionCall, name));
                    }
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, ctx, out);
        }
    }

    fn extract_function(&self, node: &Node, ctx: &FileContext) -> Option<AstNode> {
        let name_node = node.child_by_field_name("name")?;
        let name = TreeSitterParser::node_text(&name_node, ctx.content);
        let mut function = Self::new_node(ctx, node, NodeKind::Function, name);

        if let Some(receiver) = node.child_by_field_name("receiver") {
            if let Some(recv_type) = Self::receiver_type(&receiver, ctx.content) {
                function.metadata.insert("receiver".to_string(), recv_type);
            }
        }
        if let Some(result) = node.child_by_field_name("result") {
            function.metadata.insert(
                "returnType".to_string(),
                TreeSitterParser::node_text(&result, ctx.content).to_string(),
            );
        }

        Some(function)
    }

    /// Type of the receiver, without the pointer star.
    fn receiver_type(receiver: &Node, content: &str) -> Option<String> {
        let param = TreeSitterParser::children_of_kind(receiver, "parameter_declaration")
            .into_iter()
            .next()?;
        let type_node = param.child_by_field_name("type")?;
        Some(
            TreeSitterParser::node_text(&type_node, content)
                .trim_start_matches('*')
                .to_string(),
        )
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for GoParser {
    fn parse_source(&self, path: &str, content: &str) -> Result<Vec<AstNode>, ParseError> {
        let tree = self.base.parse_tree(path, content)?;
        let root = tree.root_node();

        if let Some(position) = TreeSitterParser::first_error(&root) {
            return Err(ParseError::syntax(
                path,
                format!("syntax error at {}:{}", position.row + 1, position.column + 1),
            ));
        }

        let ctx = FileContext {
            path,
            content,
            package: Self::package_name(&root, content),
        };

        let mut nodes = Vec::new();
        self.visit(root, &ctx, &mut nodes);
        Ok(nodes)
    }

    fn language(&self) -> Language {
        Language::Go
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["go"]
    }
}
