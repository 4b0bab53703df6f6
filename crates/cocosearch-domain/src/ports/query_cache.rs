//! C9 — Query Cache port.
//!
//! Two-level cache (spec §4.9): an exact-fingerprint lookup and, on a miss,
//! a semantic lookup against cached entries that carry a query embedding.
//! Grounded in `mcb-domain`'s small single-method provider ports — the
//! cache is kept as one capability, not split into get/put traits, since no
//! caller needs only one half.

use crate::error::Result;
use crate::value_objects::CachedQueryResult;
use async_trait::async_trait;

/// Result of a cache lookup, distinguishing an exact fingerprint match from
/// a semantic near-match so callers can record which path served the
/// request.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Exact(CachedQueryResult),
    Semantic(CachedQueryResult),
    Miss,
}

/// The query cache port. Implementations own both eviction (size-bounded
/// LRU) and expiry (TTL); `get`/`put` never see a logically-expired entry.
#[async_trait]
pub trait QueryCache: Send + Sync {
    /// Exact-fingerprint lookup, falling back to a semantic lookup when the
    /// exact lookup misses and `query_embedding` is `Some`. The semantic
    /// lookup is scoped to entries sharing `filter_key` — a hash of every
    /// cache-key component except the raw query text (index name, limit,
    /// min score, hybrid flag, language/symbol filters) — and only reuses an
    /// entry whose stored embedding has cosine similarity >= the
    /// implementation's threshold with `query_embedding`.
    async fn get(
        &self,
        fingerprint: &str,
        filter_key: &str,
        query_embedding: Option<&[f32]>,
    ) -> CacheLookup;

    /// Insert or replace the entry at `fingerprint`.
    async fn put(&self, entry: CachedQueryResult) -> Result<()>;

    /// Drop every entry tagged with `index_name`. Called after a reindex or
    /// a clear, since stale cached results would otherwise outlive the data
    /// they describe (spec §4.9 Invalidation, testable property #4).
    async fn invalidate_index(&self, index_name: &str) -> Result<()>;

    /// Drop every entry regardless of tag. Exposed for test teardown and
    /// full-cache resets; production invalidation always goes through
    /// [`QueryCache::invalidate_index`].
    async fn invalidate_all(&self) -> Result<()>;

    /// Current number of live (non-expired) entries, for diagnostics.
    async fn len(&self) -> usize;
}
