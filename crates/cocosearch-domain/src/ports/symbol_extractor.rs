//! C2 (Symbol Extractor) and C3 (Parse Tracker classification) ports.

use crate::entities::{FileParseVerdict, SymbolInfo};

/// Detects at most one primary symbol definition in a chunk's text. Pure
/// degradation on failure: implementations never raise, they return `None`.
pub trait SymbolExtractor: Send + Sync {
    /// Attempt to extract the primary `(symbol_type, symbol_name,
    /// symbol_signature)` from `chunk_text`, given the chunk's language.
    /// Returns `None` when the language has no symbol support, the parse
    /// produced only error nodes, or no definition node was found.
    fn extract(&self, language: &str, chunk_text: &str) -> Option<SymbolInfo>;

    /// Languages this extractor recognizes definitions for.
    fn supported_languages(&self) -> &[&str];
}

/// Classifies a whole file's parse health (spec §4.3). Implemented
/// alongside [`SymbolExtractor`] since both walk the same parse tree, but
/// kept as a distinct trait because a caller may want verdicts without
/// paying for symbol extraction (e.g. during a dry-run).
pub trait ParseVerdictClassifier: Send + Sync {
    /// Classify `file_path`'s parse health from its full content. Returns
    /// `None` when the file's extension is parse-tracking-excluded (no row
    /// should be written).
    fn classify(&self, file_path: &str, language: &str, content: &str) -> Option<FileParseVerdict>;
}
