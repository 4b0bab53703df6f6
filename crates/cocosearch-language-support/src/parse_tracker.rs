//! C3 — per-file parse-health classification, grounded in the same
//! tree-sitter plumbing C2 uses but walking the whole file's tree once to
//! look for error/missing nodes rather than hunting for a symbol.

use crate::treesitter::ParserPool;
use cocosearch_domain::constants::PARSE_TRACKING_EXCLUDED_EXTENSIONS;
use cocosearch_domain::entities::FileParseVerdict;
use cocosearch_domain::ports::ParseVerdictClassifier;
use std::path::Path;
use tree_sitter::Node;

fn extension_of(file_path: &str) -> Option<String> {
    Path::new(file_path).extension().map(|e| e.to_string_lossy().to_lowercase())
}

fn collect_error_lines(node: Node, lines: &mut Vec<usize>) {
    if node.is_error() || node.is_missing() {
        lines.push(node.start_position().row + 1);
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_lines(child, lines);
    }
}

/// Tree-sitter backed [`ParseVerdictClassifier`].
pub struct TreeSitterParseTracker {
    pool: ParserPool,
}

impl TreeSitterParseTracker {
    pub fn new() -> Self {
        Self { pool: ParserPool::new() }
    }
}

impl Default for TreeSitterParseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseVerdictClassifier for TreeSitterParseTracker {
    fn classify(&self, file_path: &str, language: &str, content: &str) -> Option<FileParseVerdict> {
        if let Some(ext) = extension_of(file_path) {
            if PARSE_TRACKING_EXCLUDED_EXTENSIONS.contains(&ext.as_str()) {
                return None;
            }
        }

        if !self.pool.supports(language) {
            return Some(FileParseVerdict::no_grammar(file_path, language));
        }

        let Some(tree) = self.pool.parse(language, content) else {
            return Some(FileParseVerdict::error(file_path, language, "parser produced no tree"));
        };

        let root = tree.root_node();
        if !root.has_error() {
            return Some(FileParseVerdict::ok(file_path, language));
        }

        let mut lines = Vec::new();
        collect_error_lines(root, &mut lines);
        lines.sort_unstable();
        lines.dedup();
        Some(FileParseVerdict::partial(file_path, language, &lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excluded_extension_produces_no_verdict() {
        let tracker = TreeSitterParseTracker::new();
        assert!(tracker.classify("README.md", "markdown", "# hello").is_none());
    }

    #[test]
    fn unsupported_language_is_no_grammar() {
        let tracker = TreeSitterParseTracker::new();
        let verdict = tracker.classify("config.hcl", "hcl", "resource {}").unwrap();
        assert_eq!(verdict.parse_status.as_str(), "no_grammar");
    }

    #[test]
    fn clean_python_file_is_ok() {
        let tracker = TreeSitterParseTracker::new();
        let verdict = tracker.classify("a.py", "python", "def f():\n    return 1\n").unwrap();
        assert_eq!(verdict.parse_status.as_str(), "ok");
    }

    #[test]
    fn syntax_error_on_a_line_is_partial_with_that_line_number() {
        let tracker = TreeSitterParseTracker::new();
        let src = "def f():\n    return 1\n\ndef g(:\n    return 2\n";
        let verdict = tracker.classify("a.py", "python", src).unwrap();
        assert_eq!(verdict.parse_status.as_str(), "partial");
        assert!(verdict.error_message.unwrap().contains('4'));
    }
}
