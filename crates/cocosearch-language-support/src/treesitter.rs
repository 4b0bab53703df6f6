//! Shared tree-sitter plumbing: language resolution and a per-language
//! parser pool. Both [`crate::symbol_extractor::TreeSitterSymbolExtractor`]
//! and [`crate::parse_tracker::TreeSitterParseTracker`] own one of these —
//! parser instances are cached per language and guarded individually,
//! since tree-sitter parsers are not re-entrant across threads. Uses
//! `parking_lot::Mutex` since each cache entry is a single `Parser`, not a
//! concurrent map.

use parking_lot::Mutex;
use std::collections::HashMap;
use tree_sitter::{Language, Parser, Tree};

/// Languages with symbol extraction and parse tracking support.
pub const SUPPORTED_LANGUAGES: &[&str] =
    &["python", "javascript", "typescript", "go", "rust", "java", "c", "cpp", "ruby", "php"];

pub fn language_for(name: &str) -> Option<Language> {
    match name {
        "python" => Some(tree_sitter_python::LANGUAGE.into()),
        "javascript" => Some(tree_sitter_javascript::LANGUAGE.into()),
        "typescript" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "go" => Some(tree_sitter_go::LANGUAGE.into()),
        "rust" => Some(tree_sitter_rust::LANGUAGE.into()),
        "java" => Some(tree_sitter_java::LANGUAGE.into()),
        "c" => Some(tree_sitter_c::LANGUAGE.into()),
        "cpp" => Some(tree_sitter_cpp::LANGUAGE.into()),
        "ruby" => Some(tree_sitter_ruby::LANGUAGE.into()),
        "php" => Some(tree_sitter_php::LANGUAGE_PHP.into()),
        _ => None,
    }
}

/// One [`Parser`] per supported language, built once and reused.
pub struct ParserPool {
    parsers: HashMap<&'static str, Mutex<Parser>>,
}

impl ParserPool {
    pub fn new() -> Self {
        let mut parsers = HashMap::new();
        for &lang in SUPPORTED_LANGUAGES {
            let Some(ts_lang) = language_for(lang) else { continue };
            let mut parser = Parser::new();
            if parser.set_language(&ts_lang).is_ok() {
                parsers.insert(lang, Mutex::new(parser));
            }
        }
        Self { parsers }
    }

    /// Parse `text` as `language`. Returns `None` when the language has no
    /// registered grammar.
    pub fn parse(&self, language: &str, text: &str) -> Option<Tree> {
        let lock = self.parsers.get(language)?;
        let mut parser = lock.lock();
        parser.parse(text, None)
    }

    pub fn supports(&self, language: &str) -> bool {
        self.parsers.contains_key(language)
    }
}

impl Default for ParserPool {
    fn default() -> Self {
        Self::new()
    }
}
