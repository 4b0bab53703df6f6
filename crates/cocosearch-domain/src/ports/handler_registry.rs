//! C1 — Handler Registry port.
//!
//! A [`Handler`] owns a file: it supplies the chunk-separator spec the
//! chunker uses to split that file, and extracts per-chunk metadata. Two
//! kinds of handlers exist per spec §4.1: language handlers (claim by
//! extension) and grammar handlers (claim by path pattern plus an optional
//! content-marker check) — both implement the same trait, distinguished
//! only by how [`HandlerRegistry::get_handler`] selects them.

use std::path::Path;

/// Coarsest-to-finest ordered list of chunk-boundary regexes for one
/// language. Regex dialect is the common subset with no lookaround, since
/// the chunker runs these through Rust's `regex` engine.
#[derive(Debug, Clone)]
pub struct SeparatorSpec {
    pub language: String,
    /// Ordered coarsest -> finest boundary patterns.
    pub patterns: Vec<String>,
}

/// Metadata a handler attaches to one chunk's text.
#[derive(Debug, Clone, Default)]
pub struct ExtractedMetadata {
    pub block_type: Option<String>,
    pub hierarchy: Option<String>,
    pub language_id: Option<String>,
}

/// A language or grammar handler.
pub trait Handler: Send + Sync {
    /// Stable name, e.g. `python`, `github_actions`.
    fn name(&self) -> &str;

    /// The separator spec this handler's chunker should use.
    fn separator_spec(&self) -> &SeparatorSpec;

    /// Derive `(block_type, hierarchy, language_id)` for one chunk's text.
    fn extract_metadata(&self, chunk_text: &str) -> ExtractedMetadata;
}

/// Resolves a file path (and, for grammar handlers, its content) to the
/// [`Handler`] that owns it.
pub trait HandlerRegistry: Send + Sync {
    /// Select the handler for `filepath`. `content` is only consulted by
    /// grammar handlers that need to sniff for a content marker; language
    /// handlers claim purely on extension and ignore it.
    fn get_handler(&self, filepath: &Path, content: Option<&str>) -> Option<&dyn Handler>;

    /// Every distinct [`SeparatorSpec`] contributed by a registered custom
    /// (non-builtin) language handler, aggregated for the chunker.
    fn all_custom_language_specs(&self) -> Vec<SeparatorSpec>;
}
