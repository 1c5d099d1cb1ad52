//! Language-agnostic AST node model.
//!
//! Every parser adapter emits [`AstNode`] values into an [`AstIndex`]. The
//! model is deliberately flat: class-only attributes (fields, resolved super
//! and sub types, inner-class bookkeeping) live on the same record and stay
//! empty for every other kind.

mod index;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use index::{AstIndex, IndexStats};

/// Separator between an enclosing class and a nested class in raw names.
pub const INNER_CLASS_SEPARATOR: char = '$';

/// Source language a node was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Java,
    Python,
}

impl Language {
    /// Fixed extension table used when walking a repository.
    ///
    /// Python is recognized so that its files are classified, but no adapter
    /// is registered for it by default.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "go" => Some(Self::Go),
            "java" => Some(Self::Java),
            "py" => Some(Self::Python),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Java => "java",
            Self::Python => "python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of source construct a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Class,
    Method,
    Function,
    Type,
    MethodCall,
    FunctionCall,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Method => "Method",
            Self::Function => "Function",
            Self::Type => "Type",
            Self::MethodCall => "MethodCall",
            Self::FunctionCall => "FunctionCall",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (package, name) pair identifying a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassRef {
    pub package: String,
    pub name: String,
}

impl ClassRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Split a qualified name at its last `.`; names without a dot have an
    /// empty package.
    pub fn from_qualified(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((package, name)) => Self::new(package, name),
            None => Self::new("", qualified),
        }
    }

    /// Rejoin package and name into the qualified form.
    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// A declared class field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    /// Declared type exactly as written in source.
    #[serde(rename = "type")]
    pub field_type: String,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Reserved edge to another node. Adapters do not populate it yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub target_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One structural construct extracted from a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    /// Opaque id, unique within one index. Not stable across builds.
    pub id: String,
    pub language: Language,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub file: String,
    #[serde(default)]
    pub package: String,
    /// 1-based, inclusive.
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub relations: Vec<Relation>,

    /// Parameter types for methods, names dropped.
    #[serde(default)]
    pub method_params: Vec<String>,

    // Class-only attributes.
    #[serde(default)]
    pub full_class_name: String,
    #[serde(default)]
    pub is_inner_class: bool,
    #[serde(default)]
    pub outer_class: String,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    /// Direct `extends`/`implements` references as qualified by the adapter.
    #[serde(default)]
    pub declared_super_classes: Vec<ClassRef>,
    /// Transitive super types, filled by the hierarchy resolver.
    #[serde(default)]
    pub super_classes: Vec<ClassRef>,
    /// Transitive sub types inside the indexed repository.
    #[serde(default)]
    pub sub_classes: Vec<ClassRef>,
}

impl AstNode {
    pub fn new(
        id: impl Into<String>,
        language: Language,
        kind: NodeKind,
        name: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            language,
            kind,
            name: name.into(),
            file: file.into(),
            package: String::new(),
            start_line: 0,
            end_line: 0,
            metadata: BTreeMap::new(),
            relations: Vec::new(),
            method_params: Vec::new(),
            full_class_name: String::new(),
            is_inner_class: false,
            outer_class: String::new(),
            fields: Vec::new(),
            declared_super_classes: Vec::new(),
            super_classes: Vec::new(),
            sub_classes: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_lines(mut self, start_line: u32, end_line: u32) -> Self {
        self.start_line = start_line;
        self.end_line = end_line;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_class(&self) -> bool {
        self.kind == NodeKind::Class
    }

    /// Whether `other` lies inside this node's line range in the same file.
    pub fn contains(&self, other: &AstNode) -> bool {
        self.file == other.file
            && other.start_line >= self.start_line
            && other.end_line <= self.end_line
    }

    /// Strict nesting: `other` starts after and ends before this node.
    pub fn strictly_contains(&self, other: &AstNode) -> bool {
        self.file == other.file
            && other.start_line > self.start_line
            && other.end_line < self.end_line
    }

    /// The (package, name) pair for a class, derived from its full name so
    /// nested classes keep their `Outer$Inner` form.
    pub fn class_ref(&self) -> ClassRef {
        if self.full_class_name.is_empty() {
            ClassRef::new(self.package.clone(), self.name.clone())
        } else {
            ClassRef::from_qualified(&self.full_class_name)
        }
    }
}
