//! Query Cache implementation: capacity + TTL via `moka::sync::Cache`'s
//! builder, `invalidate`/`invalidate_all` for teardown, extended with a
//! semantic-neighbor scan (cosine similarity over entries sharing a
//! `filter_key`) for near-duplicate query reuse beyond exact key matches.

use async_trait::async_trait;
use cocosearch_domain::error::Result;
use cocosearch_domain::ports::query_cache::{CacheLookup, QueryCache};
use cocosearch_domain::value_objects::CachedQueryResult;
use moka::sync::Cache;

/// A moka-backed [`QueryCache`]. Semantic lookups require an O(capacity)
/// scan of live entries sharing the caller's `filter_key`, since moka has no
/// built-in vector index — capacity defaults to a few hundred entries (spec
/// §4.9), so this stays cheap in practice.
pub struct MokaQueryCache {
    cache: Cache<String, CachedQueryResult>,
    ttl_secs: u64,
    semantic_threshold: f32,
}

impl MokaQueryCache {
    pub fn new(capacity: u64, ttl_secs: u64, semantic_threshold: f32) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(std::time::Duration::from_secs(ttl_secs))
            .build();
        Self {
            cache,
            ttl_secs,
            semantic_threshold,
        }
    }

    fn semantic_match(&self, filter_key: &str, query_embedding: &[f32]) -> Option<CachedQueryResult> {
        let now = chrono::Utc::now();
        self.cache
            .iter()
            .filter(|(_, entry)| entry.filter_key == filter_key)
            .filter(|(_, entry)| !entry.is_expired(now, self.ttl_secs))
            .filter_map(|(_, entry)| {
                let stored_embedding = entry.query_embedding.as_deref()?;
                let similarity = cosine_similarity(stored_embedding, query_embedding);
                (similarity >= self.semantic_threshold).then_some((similarity, entry))
            })
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, entry)| (*entry).clone())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl QueryCache for MokaQueryCache {
    async fn get(
        &self,
        fingerprint: &str,
        filter_key: &str,
        query_embedding: Option<&[f32]>,
    ) -> CacheLookup {
        if let Some(entry) = self.cache.get(fingerprint) {
            if !entry.is_expired(chrono::Utc::now(), self.ttl_secs) {
                return CacheLookup::Exact(entry);
            }
            self.cache.invalidate(fingerprint);
        }

        if let Some(embedding) = query_embedding {
            if let Some(entry) = self.semantic_match(filter_key, embedding) {
                return CacheLookup::Semantic(entry);
            }
        }

        CacheLookup::Miss
    }

    async fn put(&self, entry: CachedQueryResult) -> Result<()> {
        self.cache.insert(entry.fingerprint.clone(), entry);
        Ok(())
    }

    async fn invalidate_index(&self, index_name: &str) -> Result<()> {
        let stale: Vec<String> = self
            .cache
            .iter()
            .filter(|(_, entry)| entry.index_name == index_name)
            .map(|(key, _)| (*key).clone())
            .collect();
        for key in stale {
            self.cache.invalidate(&key);
        }
        Ok(())
    }

    async fn invalidate_all(&self) -> Result<()> {
        self.cache.invalidate_all();
        Ok(())
    }

    async fn len(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.entry_count() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocosearch_domain::value_objects::CachedQueryResult;

    fn entry(fingerprint: &str, index_name: &str, filter_key: &str, embedding: Option<Vec<f32>>) -> CachedQueryResult {
        CachedQueryResult::new(fingerprint, index_name, filter_key, chrono::Utc::now(), vec![], embedding)
    }

    #[tokio::test]
    async fn exact_hit_returns_stored_entry() {
        let cache = MokaQueryCache::new(256, 86400, 0.92);
        cache.put(entry("fp1", "idx", "fk1", None)).await.unwrap();
        match cache.get("fp1", "fk1", None).await {
            CacheLookup::Exact(_) => {}
            other => panic!("expected Exact, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn miss_when_absent() {
        let cache = MokaQueryCache::new(256, 86400, 0.92);
        assert!(matches!(cache.get("missing", "fk", None).await, CacheLookup::Miss));
    }

    #[tokio::test]
    async fn semantic_hit_on_high_similarity() {
        let cache = MokaQueryCache::new(256, 86400, 0.92);
        cache
            .put(entry("fp1", "idx", "fk1", Some(vec![1.0, 0.0, 0.0])))
            .await
            .unwrap();
        match cache.get("fp2", "fk1", Some(&[1.0, 0.0001, 0.0])).await {
            CacheLookup::Semantic(_) => {}
            other => panic!("expected Semantic, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn semantic_miss_below_threshold() {
        let cache = MokaQueryCache::new(256, 86400, 0.92);
        cache
            .put(entry("fp1", "idx", "fk1", Some(vec![1.0, 0.0, 0.0])))
            .await
            .unwrap();
        let lookup = cache.get("fp2", "fk1", Some(&[0.0, 1.0, 0.0])).await;
        assert!(matches!(lookup, CacheLookup::Miss));
    }

    #[tokio::test]
    async fn semantic_lookup_respects_filter_key_scope() {
        let cache = MokaQueryCache::new(256, 86400, 0.92);
        cache
            .put(entry("fp1", "idx", "fk1", Some(vec![1.0, 0.0, 0.0])))
            .await
            .unwrap();
        let lookup = cache.get("fp2", "fk2", Some(&[1.0, 0.0, 0.0])).await;
        assert!(matches!(lookup, CacheLookup::Miss));
    }

    #[tokio::test]
    async fn invalidate_index_only_drops_matching_tag() {
        let cache = MokaQueryCache::new(256, 86400, 0.92);
        cache.put(entry("fp1", "idx-a", "fk1", None)).await.unwrap();
        cache.put(entry("fp2", "idx-b", "fk1", None)).await.unwrap();
        cache.invalidate_index("idx-a").await.unwrap();
        assert!(matches!(cache.get("fp1", "fk1", None).await, CacheLookup::Miss));
        assert!(matches!(cache.get("fp2", "fk1", None).await, CacheLookup::Exact(_)));
    }
}
