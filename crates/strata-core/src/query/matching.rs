//! Class-identity and method-signature matching.

use crate::ast::{AstNode, NodeKind, INNER_CLASS_SEPARATOR};

/// A parsed class specifier: `Name`, `pkg.Name`, `Outer$Inner` or
/// `pkg.Outer$Inner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpecifier {
    raw: String,
    package: Option<String>,
    simple: String,
    /// `Outer$Inner` part of an inner-class specifier, without the package.
    nested_path: Option<String>,
}

impl ClassSpecifier {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        // The package ends at the last dot before the first `$`.
        let head_end = raw.find(INNER_CLASS_SEPARATOR).unwrap_or(raw.len());
        let (package, local) = match raw[..head_end].rfind('.') {
            Some(dot) => (Some(raw[..dot].to_string()), &raw[dot + 1..]),
            None => (None, raw),
        };

        let simple = local
            .rsplit(INNER_CLASS_SEPARATOR)
            .next()
            .unwrap_or(local)
            .to_string();
        let nested_path = local
            .contains(INNER_CLASS_SEPARATOR)
            .then(|| local.to_string());

        Self {
            raw: raw.to_string(),
            package,
            simple,
            nested_path,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Trailing simple name.
    pub fn simple_name(&self) -> &str {
        &self.simple
    }

    pub fn is_inner(&self) -> bool {
        self.nested_path.is_some()
    }

    /// Class-identity match.
    ///
    /// With a package the node's package must equal it; an inner specifier
    /// then needs the full `$` path verbatim, otherwise the simple names must
    /// agree. Without a package, simple names decide, and an inner specifier
    /// must match the trailing segments of the node's `$` path, so `B$C`
    /// finds `A$B$C`.
    pub fn matches(&self, node: &AstNode) -> bool {
        if node.kind != NodeKind::Class {
            return false;
        }
        match (&self.package, &self.nested_path) {
            (Some(package), _) if node.package != *package => false,
            (Some(_), Some(_)) => node.full_class_name == self.raw,
            (Some(_), None) => node.name == self.simple,
            (None, Some(path)) => {
                let full = format!("{}{}{}", node.outer_class, INNER_CLASS_SEPARATOR, node.name);
                node.name == self.simple
                    && (full == *path || full.ends_with(&format!("{INNER_CLASS_SEPARATOR}{path}")))
            }
            (None, None) => node.name == self.simple,
        }
    }

    /// Looser match used as a fallback: simple name only.
    pub fn matches_simple_name(&self, node: &AstNode) -> bool {
        node.kind == NodeKind::Class && node.name == self.simple
    }
}

/// A method specifier: a bare name, or a name with a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    /// `None` when no parentheses were given: every overload matches.
    pub param_types: Option<Vec<String>>,
}

impl MethodSignature {
    /// Parse `name` or `name(Type a, Map<K, V> b)`.
    ///
    /// Parameters split on top-level commas only. Each parameter keeps its
    /// leading type tokens; the trailing token is treated as the parameter
    /// name when there is more than one. `final` and annotations are dropped.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        let Some(open) = spec.find('(') else {
            return Self {
                name: spec.to_string(),
                param_types: None,
            };
        };

        let name = spec[..open].trim().to_string();
        let inner = &spec[open + 1..];
        let inner = match inner.rfind(')') {
            Some(close) => &inner[..close],
            None => inner,
        };

        let param_types = split_top_level(inner, |c| c == ',')
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(param_type)
            .collect();

        Self {
            name,
            param_types: Some(param_types),
        }
    }

    /// Name equality plus, when a parameter list was given, equal arity and
    /// case-insensitive type equality per position.
    pub fn matches(&self, node: &AstNode) -> bool {
        if node.kind != NodeKind::Method || node.name != self.name {
            return false;
        }
        match &self.param_types {
            None => true,
            Some(expected) => {
                expected.len() == node.method_params.len()
                    && expected
                        .iter()
                        .zip(&node.method_params)
                        .all(|(a, b)| a.to_lowercase() == b.to_lowercase())
            }
        }
    }
}

fn param_type(param: &str) -> String {
    let mut tokens: Vec<&str> = split_top_level(param, char::is_whitespace)
        .into_iter()
        .filter(|t| !t.is_empty())
        .filter(|t| *t != "final" && !t.starts_with('@'))
        .collect();
    if tokens.len() > 1 {
        tokens.pop();
    }
    tokens.join(" ")
}

/// Split on `is_sep` wherever angle-bracket depth is zero.
fn split_top_level(s: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_sep(c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}
