//! [`SearchResult`] — what the hybrid search engine hands back to callers.

/// A single ranked hit, with optional context-expansion strings attached by
/// C8 when requested.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub filename: String,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Fused/normalized score in `[0, 1]`.
    pub score: f32,
    pub language_id: Option<String>,
    pub block_type: Option<String>,
    pub hierarchy: Option<String>,
    pub symbol_type: Option<String>,
    pub symbol_name: Option<String>,
    pub symbol_signature: Option<String>,
    /// Formatted context lines before the match, one entry per line.
    pub context_before: Option<Vec<String>>,
    /// Formatted context lines after the match, one entry per line.
    pub context_after: Option<Vec<String>>,
}

impl SearchResult {
    /// Ordering used to break ties in the final result list: ascending
    /// filename, then ascending start_byte. Scores themselves sort
    /// descending (handled by the caller); this is purely the tiebreaker.
    pub fn tie_break_key(&self) -> (&str, usize) {
        (&self.filename, self.start_byte)
    }
}
