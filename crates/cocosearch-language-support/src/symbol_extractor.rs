//! Tree-sitter symbol extraction: each chunk is parsed in isolation and
//! walked in document order for its first definition node, rather than
//! building a whole file's symbol table.
//!
//! Node kinds split into two roles: **leaf** definitions (function/method/
//! interface — the first one found wins, its own children are never
//! searched further) and **container** definitions (class/impl/trait/
//! struct — transparent: search continues inside for a leaf, qualifying
//! the leaf's name with the innermost container's name). A chunk that is
//! only a bare container with no nested leaf reports the container itself
//! as a `class` symbol — containers have no dedicated recognized type among
//! `(function, method, class, interface)`, so this is the resolved
//! interpretation (see DESIGN.md).
//!
//! Go is special-cased: its methods are declared at the top level with an
//! explicit receiver, not lexically nested in a container node, so
//! qualification reads the receiver type directly off the node instead of
//! the container stack.

use crate::treesitter::{ParserPool, SUPPORTED_LANGUAGES};
use cocosearch_domain::entities::SymbolInfo;
use cocosearch_domain::ports::SymbolExtractor;
use tree_sitter::Node;

enum NodeRole {
    Leaf(&'static str),
    Container,
    None,
}

fn classify(language: &str, kind: &str) -> NodeRole {
    match (language, kind) {
        ("python", "class_definition") => NodeRole::Container,
        ("python", "function_definition") => NodeRole::Leaf("function"),

        ("javascript" | "typescript", "class_declaration") => NodeRole::Container,
        ("javascript" | "typescript", "function_declaration") => NodeRole::Leaf("function"),
        ("javascript" | "typescript", "method_definition") => NodeRole::Leaf("function"),
        ("typescript", "interface_declaration") => NodeRole::Leaf("interface"),

        ("go", "function_declaration") => NodeRole::Leaf("function"),
        // method_declaration handled separately in `walk` (receiver-qualified).
        ("rust", "impl_item") => NodeRole::Container,
        ("rust", "function_item") => NodeRole::Leaf("function"),

        ("java", "class_declaration") => NodeRole::Container,
        ("java", "interface_declaration") => NodeRole::Leaf("interface"),
        ("java", "method_declaration") => NodeRole::Leaf("function"),

        ("c", "function_definition") => NodeRole::Leaf("function"),

        ("cpp", "class_specifier") => NodeRole::Container,
        ("cpp", "struct_specifier") => NodeRole::Container,
        ("cpp", "function_definition") => NodeRole::Leaf("function"),

        ("ruby", "class") => NodeRole::Container,
        ("ruby", "module") => NodeRole::Container,
        ("ruby", "method") => NodeRole::Leaf("function"),

        ("php", "class_declaration") => NodeRole::Container,
        ("php", "interface_declaration") => NodeRole::Leaf("interface"),
        ("php", "function_definition") => NodeRole::Leaf("function"),
        ("php", "method_declaration") => NodeRole::Leaf("function"),

        _ => NodeRole::None,
    }
}

fn extract_name(language: &str, node: Node, source: &[u8]) -> Option<String> {
    if let Some(name_node) = node.child_by_field_name("name") {
        if let Ok(text) = name_node.utf8_text(source) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    if language == "rust" && node.kind() == "impl_item" {
        if let Some(type_node) = node.child_by_field_name("type") {
            if let Ok(text) = type_node.utf8_text(source) {
                return Some(text.trim().to_string());
            }
        }
    }
    None
}

fn go_receiver_type(node: Node, source: &[u8]) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    for child in receiver.named_children(&mut cursor) {
        if child.kind() == "parameter_declaration" {
            if let Some(type_node) = child.child_by_field_name("type") {
                let text = type_node.utf8_text(source).ok()?;
                return Some(text.trim_start_matches('*').to_string());
            }
        }
    }
    None
}

/// Find the header-terminating colon in a Python/Ruby definition's first
/// line, skipping colons nested inside the parameter list (e.g. the
/// annotation colon in `def foo(x: int) -> int:` must not end the header
/// at `x:` — only the colon back at bracket-nesting depth 0 does).
fn header_colon(first_line: &str) -> Option<usize> {
    let mut depth: i32 = 0;
    for (i, ch) in first_line.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ':' if depth <= 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn signature_header_end(node: Node, source: &[u8], language: &str) -> usize {
    if language == "python" || language == "ruby" {
        if let Some(body) = node.child_by_field_name("body") {
            return body.start_byte();
        }
    }
    let text = node.utf8_text(source).unwrap_or("");
    let first_line = text.lines().next().unwrap_or("");
    let rel_end = if language == "python" || language == "ruby" {
        header_colon(first_line).map(|i| i + 1).unwrap_or(first_line.len())
    } else {
        first_line.find('{').unwrap_or(first_line.len())
    };
    node.start_byte() + rel_end
}

fn truncate_signature(sig: &str) -> String {
    if sig.chars().count() > 200 {
        let truncated: String = sig.chars().take(200).collect();
        format!("{truncated}…")
    } else {
        sig.trim_end().to_string()
    }
}

fn extract_signature(language: &str, node: Node, source: &[u8]) -> String {
    let start_node = match node.parent() {
        Some(parent) if parent.kind() == "decorated_definition" => parent,
        _ => node,
    };
    let header_end = signature_header_end(node, source, language);
    let bytes = source.get(start_node.start_byte()..header_end).unwrap_or(b"");
    let sig = String::from_utf8_lossy(bytes).trim().to_string();
    truncate_signature(&sig)
}

fn walk(
    node: Node,
    source: &[u8],
    language: &str,
    container_stack: &mut Vec<String>,
    first_container: &mut Option<SymbolInfo>,
) -> Option<SymbolInfo> {
    if language == "go" && node.kind() == "method_declaration" {
        let name = extract_name(language, node, source)?;
        let qualified = match go_receiver_type(node, source) {
            Some(receiver) => format!("{receiver}.{name}"),
            None => name,
        };
        return Some(SymbolInfo {
            symbol_type: "method".to_string(),
            symbol_name: qualified,
            symbol_signature: extract_signature(language, node, source),
        });
    }

    match classify(language, node.kind()) {
        NodeRole::Leaf(label) => {
            let name = extract_name(language, node, source)?;
            let signature = extract_signature(language, node, source);
            let (symbol_type, symbol_name) = match container_stack.last() {
                Some(container) if label == "function" => {
                    ("method".to_string(), format!("{container}.{name}"))
                }
                _ => (label.to_string(), name),
            };
            Some(SymbolInfo { symbol_type, symbol_name, symbol_signature: signature })
        }
        NodeRole::Container => {
            let name = extract_name(language, node, source).unwrap_or_default();
            if first_container.is_none() {
                *first_container = Some(SymbolInfo {
                    symbol_type: "class".to_string(),
                    symbol_name: name.clone(),
                    symbol_signature: extract_signature(language, node, source),
                });
            }
            container_stack.push(name);
            let mut cursor = node.walk();
            let mut found = None;
            for child in node.children(&mut cursor) {
                if let Some(result) = walk(child, source, language, container_stack, first_container) {
                    found = Some(result);
                    break;
                }
            }
            container_stack.pop();
            found
        }
        NodeRole::None => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if let Some(result) = walk(child, source, language, container_stack, first_container) {
                    return Some(result);
                }
            }
            None
        }
    }
}

fn find_symbol(root: Node, source: &[u8], language: &str) -> Option<SymbolInfo> {
    let mut container_stack = Vec::new();
    let mut first_container = None;
    walk(root, source, language, &mut container_stack, &mut first_container).or(first_container)
}

/// Tree-sitter backed [`SymbolExtractor`]. Holds one parser per supported
/// language; `extract` re-parses the chunk text fresh each call (trees are
/// small — one chunk, not a whole file — so this is cheap).
pub struct TreeSitterSymbolExtractor {
    pool: ParserPool,
}

impl TreeSitterSymbolExtractor {
    pub fn new() -> Self {
        Self { pool: ParserPool::new() }
    }
}

impl Default for TreeSitterSymbolExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolExtractor for TreeSitterSymbolExtractor {
    fn extract(&self, language: &str, chunk_text: &str) -> Option<SymbolInfo> {
        let tree = self.pool.parse(language, chunk_text)?;
        find_symbol(tree.root_node(), chunk_text.as_bytes(), language)
    }

    fn supported_languages(&self) -> &[&str] {
        SUPPORTED_LANGUAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_top_level_function_is_unqualified() {
        let extractor = TreeSitterSymbolExtractor::new();
        let symbol = extractor.extract("python", "def hello():\n    return \"world\"\n").unwrap();
        assert_eq!(symbol.symbol_type, "function");
        assert_eq!(symbol.symbol_name, "hello");
        assert_eq!(symbol.symbol_signature, "def hello():");
    }

    #[test]
    fn python_signature_keeps_full_annotation_and_return_type() {
        let extractor = TreeSitterSymbolExtractor::new();
        let src = "def foo(x: int) -> int:\n    return x\n";
        let symbol = extractor.extract("python", src).unwrap();
        assert_eq!(symbol.symbol_signature, "def foo(x: int) -> int:");
    }

    #[test]
    fn python_method_nested_in_class_is_qualified() {
        let extractor = TreeSitterSymbolExtractor::new();
        let src = "class Widget:\n    def render(self):\n        pass\n";
        let symbol = extractor.extract("python", src).unwrap();
        assert_eq!(symbol.symbol_type, "method");
        assert_eq!(symbol.symbol_name, "Widget.render");
    }

    #[test]
    fn bare_class_with_no_methods_reports_class_symbol() {
        let extractor = TreeSitterSymbolExtractor::new();
        let symbol = extractor.extract("python", "class Empty:\n    pass\n").unwrap();
        assert_eq!(symbol.symbol_type, "class");
        assert_eq!(symbol.symbol_name, "Empty");
    }

    #[test]
    fn rust_method_inside_impl_is_qualified() {
        let extractor = TreeSitterSymbolExtractor::new();
        let src = "impl Config {\n    pub fn new() -> Self {\n        Config {}\n    }\n}\n";
        let symbol = extractor.extract("rust", src).unwrap();
        assert_eq!(symbol.symbol_type, "method");
        assert_eq!(symbol.symbol_name, "Config.new");
    }

    #[test]
    fn go_method_qualified_by_receiver() {
        let extractor = TreeSitterSymbolExtractor::new();
        let src = "func (c *Config) Validate() bool {\n\treturn true\n}\n";
        let symbol = extractor.extract("go", src).unwrap();
        assert_eq!(symbol.symbol_type, "method");
        assert_eq!(symbol.symbol_name, "Config.Validate");
    }

    #[test]
    fn unsupported_language_returns_none() {
        let extractor = TreeSitterSymbolExtractor::new();
        assert!(extractor.extract("yaml", "key: value").is_none());
    }

    #[test]
    fn unparseable_garbage_degrades_to_none() {
        let extractor = TreeSitterSymbolExtractor::new();
        assert!(extractor.extract("python", "!!! not python at all ???").is_none());
    }
}
