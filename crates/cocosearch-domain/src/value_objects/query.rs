//! [`Query`] — the ephemeral search request. Never persisted; see spec §3.

use crate::entities::IndexName;
use crate::error::{CocoError, Result, MAX_QUERY_LEN};
use std::collections::BTreeSet;

/// A fully-specified search request. Construct via [`Query::new`], then
/// adjust optional fields with the builder-style `with_*` methods — mirrors
/// the way the teacher's handler/searcher types use `with_*` chains.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub index_name: IndexName,
    pub limit: usize,
    pub min_score: f32,
    /// Language aliases to filter on, e.g. `["ts"]` expands to `{typescript}`
    /// at the retrieval layer; this value object stores the raw input.
    pub language_filter: Option<Vec<String>>,
    pub symbol_type: Option<BTreeSet<String>>,
    pub symbol_name: Option<String>,
    pub use_hybrid: Option<bool>,
    pub smart_context: bool,
    pub context_before: Option<usize>,
    pub context_after: Option<usize>,
    pub no_cache: bool,
}

impl Query {
    /// Construct a query with spec-default flags: `smart_context = true`,
    /// no explicit context window, hybrid mode left to the analyzer
    /// (`use_hybrid = None`), caching enabled.
    ///
    /// Validates `text` is non-empty and under [`MAX_QUERY_LEN`] chars —
    /// anything else is a caller bug and is checked by the search engine
    /// before this value object is built (index existence, flag
    /// combinations) rather than here.
    pub fn new(text: impl Into<String>, index_name: IndexName, limit: usize) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CocoError::validation("query text must not be empty"));
        }
        if text.chars().count() > MAX_QUERY_LEN {
            return Err(CocoError::validation(format!(
                "query exceeds {MAX_QUERY_LEN} character limit: '{}'",
                CocoError::truncate_query(&text)
            )));
        }
        Ok(Self {
            text,
            index_name,
            limit: limit.max(1),
            min_score: 0.0,
            language_filter: None,
            symbol_type: None,
            symbol_name: None,
            use_hybrid: None,
            smart_context: true,
            context_before: None,
            context_after: None,
            no_cache: false,
        })
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_language_filter(mut self, languages: Vec<String>) -> Self {
        self.language_filter = Some(languages);
        self
    }

    /// Symbol-type filter. Stored sorted so the exact cache key is
    /// invariant under caller ordering (spec testable property #10).
    pub fn with_symbol_type(mut self, types: impl IntoIterator<Item = String>) -> Self {
        self.symbol_type = Some(types.into_iter().collect());
        self
    }

    pub fn with_symbol_name(mut self, glob: impl Into<String>) -> Self {
        self.symbol_name = Some(glob.into());
        self
    }

    pub fn with_use_hybrid(mut self, use_hybrid: bool) -> Self {
        self.use_hybrid = Some(use_hybrid);
        self
    }

    /// Switch to explicit context mode with the given before/after line
    /// counts, disabling smart-context expansion.
    pub fn with_explicit_context(mut self, before: usize, after: usize) -> Self {
        self.smart_context = false;
        self.context_before = Some(before);
        self.context_after = Some(after);
        self
    }

    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx() -> IndexName {
        IndexName::parse("demo").unwrap()
    }

    #[test]
    fn rejects_empty_text() {
        assert!(Query::new("   ", idx(), 10).is_err());
    }

    #[test]
    fn rejects_over_length_text() {
        let long = "a".repeat(MAX_QUERY_LEN + 1);
        let err = Query::new(long, idx(), 10).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn symbol_type_set_is_order_independent() {
        let a = Query::new("x", idx(), 5).unwrap().with_symbol_type(["class".to_string(), "function".to_string()]);
        let b = Query::new("x", idx(), 5).unwrap().with_symbol_type(["function".to_string(), "class".to_string()]);
        assert_eq!(a.symbol_type, b.symbol_type);
    }
}
