//! Context Expander: UTF-8 lossy file reads with byte-range slicing,
//! combined with `cocosearch-language-support::treesitter::ParserPool` for
//! the smallest-enclosing-definition lookup smart mode needs. The bounded
//! LRU file cache is an explicit map with an explicit `clear()` called at
//! the end of `search()`, rather than an implicitly-memoized cache.

use cocosearch_domain::constants::{
    DEFAULT_CONTEXT_LINES, MAX_CONTEXT_LINE_CHARS, MAX_CONTEXT_LINES, MIN_CONTEXT_FILE_CACHE_CAPACITY,
};
use cocosearch_language_support::treesitter::ParserPool;
use moka::sync::Cache;
use std::path::Path;
use std::sync::Arc;
use tree_sitter::Node;

/// Definition-level node kinds smart mode treats as an enclosing scope:
/// `function_definition`, `class_definition`, and their language-equivalent
/// variants for JS/TS, Go, Rust.
fn is_definition_node(language: &str, kind: &str) -> bool {
    matches!(
        (language, kind),
        ("python", "function_definition" | "class_definition")
            | ("javascript" | "typescript", "function_declaration" | "class_declaration" | "method_definition")
            | ("go", "function_declaration" | "method_declaration")
            | ("rust", "function_item" | "impl_item")
    )
}

/// A window of expanded context around a matched chunk, ready to attach to
/// a `SearchResult`.
pub struct ExpandedContext {
    pub context_before: Vec<String>,
    pub context_after: Vec<String>,
}

/// Instance-scoped cache of file contents and parsed trees, used across one
/// `search()` call's worth of context expansion and cleared at its end.
pub struct ContextExpander {
    file_cache: Cache<String, Arc<String>>,
    parser_pool: ParserPool,
}

impl ContextExpander {
    pub fn new() -> Self {
        Self::with_capacity(MIN_CONTEXT_FILE_CACHE_CAPACITY as u64)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        let capacity = capacity.max(MIN_CONTEXT_FILE_CACHE_CAPACITY as u64);
        Self {
            file_cache: Cache::builder().max_capacity(capacity).build(),
            parser_pool: ParserPool::new(),
        }
    }

    /// Drop every cached file. Called at the end of each outer `search()`
    /// call so a later call never sees a stale read of a re-indexed file.
    pub fn clear(&self) {
        self.file_cache.invalidate_all();
        self.file_cache.run_pending_tasks();
    }

    fn read_file(&self, root: &Path, filename: &str) -> Option<Arc<String>> {
        if let Some(cached) = self.file_cache.get(filename) {
            return Some(cached);
        }
        let path = root.join(filename);
        let bytes = std::fs::read(&path).ok()?;
        let content = Arc::new(String::from_utf8_lossy(&bytes).into_owned());
        self.file_cache.insert(filename.to_string(), content.clone());
        Some(content)
    }

    /// Expand context for one chunk. `root` is the directory chunk
    /// filenames are relative to. Returns `None` when the file is missing,
    /// so the caller drops the result entirely rather than returning it
    /// with empty context.
    pub fn expand(
        &self,
        root: &Path,
        filename: &str,
        language_id: Option<&str>,
        start_byte: usize,
        end_byte: usize,
        smart_context: bool,
        context_before: Option<usize>,
        context_after: Option<usize>,
    ) -> Option<ExpandedContext> {
        let content = self.read_file(root, filename)?;

        if smart_context {
            if let Some(language) = language_id {
                if let Some(tree) = self.parser_pool.parse(language, &content) {
                    if let Some(window) =
                        smart_window(tree.root_node(), language, start_byte, end_byte, &content)
                    {
                        return Some(window);
                    }
                }
            }
        }

        let before = context_before.unwrap_or(DEFAULT_CONTEXT_LINES);
        let after = context_after.unwrap_or(DEFAULT_CONTEXT_LINES);
        Some(explicit_window(&content, start_byte, end_byte, before, after))
    }
}

impl Default for ContextExpander {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate the smallest enclosing definition node covering `[start, end)`
/// and render a before/after window from its boundaries, falling back to
/// `None` (explicit mode) when no such node exists or the file has no
/// parser for `language`.
fn smart_window(root: Node, language: &str, start: usize, end: usize, source: &str) -> Option<ExpandedContext> {
    let mut best: Option<Node> = None;
    visit_smallest_enclosing(root, language, start, end, &mut best);
    let node = best?;

    let before_lines = lines_in_range(source, node.start_byte(), start);
    let after_lines = lines_in_range(source, end, node.end_byte());

    let total = before_lines.len() + after_lines.len();
    if total > MAX_CONTEXT_LINES {
        return Some(centered_window(source, start, end, MAX_CONTEXT_LINES));
    }

    Some(ExpandedContext {
        context_before: format_lines(source, &before_lines),
        context_after: format_lines(source, &after_lines),
    })
}

fn visit_smallest_enclosing<'a>(node: Node<'a>, language: &str, start: usize, end: usize, best: &mut Option<Node<'a>>) {
    if node.start_byte() > start || node.end_byte() < end {
        return;
    }
    if is_definition_node(language, node.kind()) {
        *best = Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_smallest_enclosing(child, language, start, end, best);
    }
}

/// 1-indexed line numbers whose byte span overlaps `[from, to)`.
fn lines_in_range(source: &str, from: usize, to: usize) -> Vec<usize> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for (idx, line) in source.split_inclusive('\n').enumerate() {
        let line_start = offset;
        let line_end = offset + line.len();
        if line_end > from && line_start < to {
            lines.push(idx + 1);
        }
        offset = line_end;
        if line_start >= to {
            break;
        }
    }
    lines
}

fn format_lines(source: &str, line_numbers: &[usize]) -> Vec<String> {
    let all_lines: Vec<&str> = source.split('\n').collect();
    line_numbers
        .iter()
        .filter_map(|&n| {
            all_lines.get(n - 1).map(|text| {
                let truncated = truncate_line(text);
                format!("{n}: {truncated}")
            })
        })
        .collect()
}

fn truncate_line(text: &str) -> String {
    if text.chars().count() > MAX_CONTEXT_LINE_CHARS {
        let truncated: String = text.chars().take(MAX_CONTEXT_LINE_CHARS).collect();
        format!("{truncated}…")
    } else {
        text.to_string()
    }
}

fn explicit_window(source: &str, start: usize, end: usize, before: usize, after: usize) -> ExpandedContext {
    let all_lines: Vec<&str> = source.split('\n').collect();
    let match_lines = lines_in_range(source, start, end);
    let (first_match, last_match) = match (match_lines.first(), match_lines.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => (1, 1),
    };

    let before_start = first_match.saturating_sub(before).max(1);
    let mut before_out: Vec<String> = (before_start..first_match)
        .filter_map(|n| all_lines.get(n - 1).map(|t| format!("{n}: {}", truncate_line(t))))
        .collect();
    if before_start == 1 && first_match <= before + 1 {
        before_out.insert(0, "[BOF]".to_string());
    }

    let after_end = (last_match + after).min(all_lines.len());
    let mut after_out: Vec<String> = (last_match + 1..=after_end)
        .filter_map(|n| all_lines.get(n - 1).map(|t| format!("{n}: {}", truncate_line(t))))
        .collect();
    if after_end == all_lines.len() {
        after_out.push("[EOF]".to_string());
    }

    ExpandedContext {
        context_before: before_out,
        context_after: after_out,
    }
}

/// Center a `max_lines`-line window on the match when the enclosing
/// definition's natural window would exceed the hard cap.
fn centered_window(source: &str, start: usize, end: usize, max_lines: usize) -> ExpandedContext {
    let half = max_lines / 2;
    explicit_window(source, start, end, half, half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn smart_context_finds_enclosing_function() {
        let dir = tempfile::tempdir().unwrap();
        let content = "def hello():\n    x = 1\n    return x\n";
        write_temp(&dir, "a.py", content);

        let expander = ContextExpander::new();
        let start = content.find("x = 1").unwrap();
        let end = start + "x = 1".len();
        let expanded = expander
            .expand(dir.path(), "a.py", Some("python"), start, end, true, None, None)
            .unwrap();
        assert!(expanded.context_before.iter().any(|l| l.contains("def hello")));
        assert!(expanded.context_after.iter().any(|l| l.contains("return x")));
    }

    #[test]
    fn missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let expander = ContextExpander::new();
        assert!(expander
            .expand(dir.path(), "missing.py", Some("python"), 0, 1, true, None, None)
            .is_none());
    }

    #[test]
    fn explicit_mode_respects_requested_line_counts() {
        let dir = tempfile::tempdir().unwrap();
        let content = "one\ntwo\nthree\nfour\nfive\n";
        write_temp(&dir, "b.txt", content);

        let expander = ContextExpander::new();
        let start = content.find("three").unwrap();
        let end = start + "three".len();
        let expanded = expander
            .expand(dir.path(), "b.txt", None, start, end, false, Some(1), Some(1))
            .unwrap();
        assert_eq!(expanded.context_before.len(), 1);
        assert_eq!(expanded.context_after.len(), 1);
    }

    #[test]
    fn beginning_of_file_gets_marker() {
        let dir = tempfile::tempdir().unwrap();
        let content = "one\ntwo\nthree\n";
        write_temp(&dir, "c.txt", content);

        let expander = ContextExpander::new();
        let start = content.find("one").unwrap();
        let end = start + "one".len();
        let expanded = expander
            .expand(dir.path(), "c.txt", None, start, end, false, Some(2), Some(0))
            .unwrap();
        assert!(expanded.context_before.iter().any(|l| l == "[BOF]"));
    }

    #[test]
    fn file_read_twice_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let content = "a\nb\nc\n";
        write_temp(&dir, "d.txt", content);

        let expander = ContextExpander::new();
        let _ = expander.expand(dir.path(), "d.txt", None, 0, 1, false, Some(0), Some(0));
        let cached = expander.read_file(dir.path(), "d.txt");
        assert!(cached.is_some());
    }
}
