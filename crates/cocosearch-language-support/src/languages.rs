//! Built-in language handlers. One [`LanguageHandler`] per row of
//! [`LANGUAGE_TABLE`], claimed by extension. `block_type` is derived from a
//! small ordered list of "first line of chunk" regexes per language — a
//! shallow heuristic for scan-time classification, not a full parse (that
//! full parse is the symbol extractor's job).

use cocosearch_domain::ports::{ExtractedMetadata, Handler, SeparatorSpec};
use regex::Regex;

/// A language handler: owns one [`SeparatorSpec`] and a block-type
/// classifier over a chunk's first non-blank line.
pub struct LanguageHandler {
    name: &'static str,
    extensions: &'static [&'static str],
    spec: SeparatorSpec,
    block_patterns: Vec<(Regex, &'static str)>,
}

impl LanguageHandler {
    fn new(
        name: &'static str,
        extensions: &'static [&'static str],
        language_id: &'static str,
        separator_patterns: &[&str],
        block_rules: &[(&str, &'static str)],
    ) -> Self {
        let block_patterns = block_rules
            .iter()
            .filter_map(|(pat, label)| Regex::new(pat).ok().map(|re| (re, *label)))
            .collect();
        Self {
            name,
            extensions,
            spec: SeparatorSpec {
                language: language_id.to_string(),
                patterns: separator_patterns.iter().map(|s| s.to_string()).collect(),
            },
            block_patterns,
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }
}

impl Handler for LanguageHandler {
    fn name(&self) -> &str {
        self.name
    }

    fn separator_spec(&self) -> &SeparatorSpec {
        &self.spec
    }

    fn extract_metadata(&self, chunk_text: &str) -> ExtractedMetadata {
        let first_line = chunk_text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let block_type = self
            .block_patterns
            .iter()
            .find(|(re, _)| re.is_match(first_line))
            .map(|(_, label)| label.to_string());
        ExtractedMetadata { block_type, hierarchy: None, language_id: Some(self.spec.language.clone()) }
    }
}

/// Construct every built-in language handler. Order matters only for
/// determinism of iteration; extension claims are resolved by the registry,
/// which treats a duplicate claim as a fatal conflict.
pub fn builtin_handlers() -> Vec<LanguageHandler> {
    vec![
        LanguageHandler::new(
            "python",
            &["py", "pyi"],
            "python",
            &[r"\nclass ", r"\n\s*(async\s+)?def ", r"\n\n"],
            &[(r"^class\s", "class"), (r"^(async\s+)?def\s", "function"), (r"^@", "decorator")],
        ),
        LanguageHandler::new(
            "javascript",
            &["js", "jsx", "mjs", "cjs"],
            "javascript",
            &[r"\n(export\s+)?class ", r"\n(export\s+)?(async\s+)?function ", r"\n\n"],
            &[(r"^(export\s+)?class\s", "class"), (r"^(export\s+)?(default\s+)?(async\s+)?function\s", "function")],
        ),
        LanguageHandler::new(
            "typescript",
            &["ts", "tsx"],
            "typescript",
            &[
                r"\n(export\s+)?(abstract\s+)?class ",
                r"\n(export\s+)?interface ",
                r"\n(export\s+)?(async\s+)?function ",
                r"\n\n",
            ],
            &[
                (r"^(export\s+)?(abstract\s+)?class\s", "class"),
                (r"^(export\s+)?interface\s", "interface"),
                (r"^(export\s+)?(default\s+)?(async\s+)?function\s", "function"),
            ],
        ),
        LanguageHandler::new(
            "go",
            &["go"],
            "go",
            &[r"\nfunc ", r"\ntype ", r"\n\n"],
            &[(r"^func\s+\([^)]*\)\s", "method"), (r"^func\s", "function"), (r"^type\s", "type")],
        ),
        LanguageHandler::new(
            "rust",
            &["rs"],
            "rust",
            &[r"\n(pub\s+)?(impl|trait) ", r"\n\s*(pub\s+)?(async\s+)?fn ", r"\n\n"],
            &[
                (r"^(pub\s+)?impl\s", "impl"),
                (r"^(pub\s+)?trait\s", "trait"),
                (r"^\s*(pub\s+)?(async\s+)?fn\s", "function"),
                (r"^(pub\s+)?(struct|enum)\s", "type"),
            ],
        ),
        LanguageHandler::new(
            "java",
            &["java"],
            "java",
            &[r"\n(public\s+|private\s+|protected\s+)?(abstract\s+)?class ", r"\n(public\s+|private\s+|protected\s+)?interface ", r"\n\n"],
            &[
                (r"^(public\s+|private\s+|protected\s+)?(abstract\s+)?class\s", "class"),
                (r"^(public\s+|private\s+|protected\s+)?interface\s", "interface"),
            ],
        ),
        LanguageHandler::new(
            "c",
            &["c", "h"],
            "c",
            &[r"\n\w[\w\s\*]*\([^;{]*\)\s*\{", r"\n\n"],
            &[],
        ),
        LanguageHandler::new(
            "cpp",
            &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
            "cpp",
            &[r"\n(class|struct) ", r"\n\w[\w:<>\s\*&]*\([^;{]*\)\s*\{", r"\n\n"],
            &[(r"^(class|struct)\s", "class")],
        ),
        LanguageHandler::new(
            "ruby",
            &["rb"],
            "ruby",
            &[r"\nclass ", r"\nmodule ", r"\n\s*def ", r"\n\n"],
            &[(r"^class\s", "class"), (r"^module\s", "module"), (r"^\s*def\s", "function")],
        ),
        LanguageHandler::new(
            "php",
            &["php"],
            "php",
            &[r"\n(final\s+|abstract\s+)?class ", r"\ninterface ", r"\n\s*(public\s+|private\s+|protected\s+)?function ", r"\n\n"],
            &[
                (r"^(final\s+|abstract\s+)?class\s", "class"),
                (r"^interface\s", "interface"),
                (r"^\s*(public\s+|private\s+|protected\s+)?(static\s+)?function\s", "function"),
            ],
        ),
        // Text-only formats: parse-tracking excludes these extensions (§4.3),
        // but C1 still chunks and indexes them with a generic paragraph split.
        LanguageHandler::new(
            "markdown",
            &["md", "mdx"],
            "markdown",
            &[r"\n#{1,6}\s", r"\n\n"],
            &[(r"^#{1,6}\s", "heading")],
        ),
        LanguageHandler::new("yaml", &["yaml", "yml"], "yaml", &[r"\n\S", r"\n\n"], &[]),
        LanguageHandler::new("json", &["json"], "json", &[r"\n\n", r",\n"], &[]),
        LanguageHandler::new("toml", &["toml"], "toml", &[r"\n\[", r"\n\n"], &[(r"^\[", "section")]),
        LanguageHandler::new("xml", &["xml", "dtd"], "xml", &[r"\n<", r"\n\n"], &[]),
        LanguageHandler::new("csv", &["csv"], "csv", &[r"\n"], &[]),
        LanguageHandler::new("text", &["txt"], "text", &[r"\n\n", r"\n"], &[]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_handler_classifies_class_and_function() {
        let handlers = builtin_handlers();
        let python = handlers.iter().find(|h| h.name() == "python").unwrap();
        assert_eq!(python.extract_metadata("class Foo:\n    pass").block_type, Some("class".into()));
        assert_eq!(python.extract_metadata("def foo():\n    pass").block_type, Some("function".into()));
    }

    #[test]
    fn every_handler_has_a_non_empty_separator_spec() {
        for handler in builtin_handlers() {
            assert!(!handler.separator_spec().patterns.is_empty(), "{} has no separators", handler.name());
        }
    }
}
