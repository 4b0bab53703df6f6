//! [`CachedQueryResult`] — the value stored by C9 (Query Cache).

use super::SearchResult;
use chrono::{DateTime, Utc};

/// An entry in the query cache: the fingerprint, when it was stored, the
/// results, and — for vector-path entries — the query embedding, retained
/// so a later query can reuse it via a semantic hit.
#[derive(Debug, Clone)]
pub struct CachedQueryResult {
    /// SHA-256 hex digest of the canonical query fingerprint (see C9).
    pub fingerprint: String,
    /// The index this entry's query ran against — lets a reindex invalidate
    /// only the entries tagged with that index name rather than the whole
    /// cache (spec §4.9 "Invalidation").
    pub index_name: String,
    /// Hash of every cache-key component except the raw query text. Two
    /// entries with the same `filter_key` ran the same filters against the
    /// same index and differ only in query text, making them eligible
    /// semantic-cache neighbors.
    pub filter_key: String,
    pub stored_at: DateTime<Utc>,
    pub results: Vec<SearchResult>,
    /// Present for entries inserted off the vector retrieval path; absent
    /// when the query never reached embedding (e.g. an exact cache hit was
    /// immediately served and nothing new was inserted).
    pub query_embedding: Option<Vec<f32>>,
}

impl CachedQueryResult {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fingerprint: impl Into<String>,
        index_name: impl Into<String>,
        filter_key: impl Into<String>,
        stored_at: DateTime<Utc>,
        results: Vec<SearchResult>,
        query_embedding: Option<Vec<f32>>,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            index_name: index_name.into(),
            filter_key: filter_key.into(),
            stored_at,
            results,
            query_embedding,
        }
    }

    /// Whether this entry is older than `ttl_secs`, relative to `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl_secs: u64) -> bool {
        let age = now.signed_duration_since(self.stored_at);
        age.num_seconds() >= ttl_secs as i64
    }
}
