//! C5 (Schema & Storage) and the storage-facing half of C10 (Index
//! Management) port.
//!
//! Kept as a single trait, not split per spec's design note §9 ("avoid
//! cyclic coupling between search and storage by keeping the
//! column-presence probe inside Storage, not Search"): `Search` receives a
//! [`StorageFeatures`] snapshot at construction instead of querying
//! `information_schema` itself.

use crate::entities::{Chunk, FileParseVerdict, IndexName};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Filter predicates shared by vector and keyword retrieval (spec §4.7
/// step 3).
#[derive(Debug, Clone, Default)]
pub struct RetrievalFilter {
    /// Already alias-expanded language ids (e.g. `ts` -> `typescript`).
    pub language_ids: Option<Vec<String>>,
    pub symbol_types: Option<BTreeSet<String>>,
    /// Glob translated by the caller into a SQL `LIKE`/regex pattern
    /// ready for the storage backend to apply directly.
    pub symbol_name_like: Option<String>,
}

impl RetrievalFilter {
    pub fn is_empty(&self) -> bool {
        self.language_ids.is_none() && self.symbol_types.is_none() && self.symbol_name_like.is_none()
    }
}

/// One candidate returned by either retrieval path, carrying enough of the
/// chunk to build a [`crate::value_objects::SearchResult`] plus the
/// retrieval-specific rank needed for RRF.
#[derive(Debug, Clone)]
pub struct ScoredChunkRef {
    pub filename: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub language_id: Option<String>,
    pub block_type: Option<String>,
    pub hierarchy: Option<String>,
    pub symbol_type: Option<String>,
    pub symbol_name: Option<String>,
    pub symbol_signature: Option<String>,
    /// 0-indexed rank within this retrieval's result list, ascending by
    /// relevance (rank 0 = best match).
    pub rank: usize,
    /// The path-specific raw score: `1 - cosine_distance` for vector,
    /// `ts_rank_cd` for keyword. Not directly comparable across paths —
    /// fusion uses `rank`, not this value.
    pub raw_score: f32,
}

/// Which optional columns an existing index's chunk table has. Probed once
/// per process per index and cached by the storage adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageFeatures {
    pub has_symbol_columns: bool,
    pub has_content_tsv: bool,
}

/// Counts of inserted/updated/deleted rows from one indexing run.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Per-language chunk counts, part of C10's `get_language_stats`.
#[derive(Debug, Clone)]
pub struct LanguageCount {
    pub language_id: String,
    pub chunk_count: usize,
}

/// Per-parse-status file counts, part of C10's `get_parse_stats`.
#[derive(Debug, Clone)]
pub struct ParseStatusCount {
    pub parse_status: String,
    pub file_count: usize,
}

/// Aggregate statistics for one index, per C10.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub chunk_count: usize,
    pub file_count: usize,
    pub storage_bytes: u64,
    pub languages: Vec<LanguageCount>,
    pub parse_statuses: Vec<ParseStatusCount>,
}

/// The storage port: schema setup, persistence, retrieval, and the
/// management operations C10 needs. A single implementation
/// (`cocosearch-providers::storage::PostgresStorage`) backs production use;
/// tests use an in-memory fake.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the chunk table and parse-results table for `index` if
    /// absent, and upgrade an older index's schema in place via
    /// column-presence probes. Idempotent.
    async fn ensure_schema(&self, index: &IndexName, embedding_dim: usize) -> Result<()>;

    /// Content hash of the currently-stored row at this identity, if one
    /// exists — used by the pipeline's incrementality check (spec §4.4).
    async fn existing_content_hash(
        &self,
        index: &IndexName,
        filename: &str,
        start_byte: usize,
        end_byte: usize,
    ) -> Result<Option<String>>;

    /// Upsert a batch of chunks keyed by `(filename, start_byte,
    /// end_byte)`. Must commit atomically per batch.
    async fn upsert_chunks(&self, index: &IndexName, chunks: &[Chunk]) -> Result<UpsertSummary>;

    /// Delete every chunk row whose `filename` is not in `present_files`.
    /// Returns the number of rows deleted.
    async fn delete_chunks_not_in(
        &self,
        index: &IndexName,
        present_files: &[String],
    ) -> Result<usize>;

    /// Truncate and rewrite the parse-results table within one transaction.
    async fn replace_parse_verdicts(
        &self,
        index: &IndexName,
        verdicts: &[FileParseVerdict],
    ) -> Result<()>;

    /// Probe (and cache) which optional columns this index's chunk table
    /// carries.
    async fn features(&self, index: &IndexName) -> Result<StorageFeatures>;

    /// Order by `embedding <=> query_embedding` ascending, apply `filter`,
    /// return up to `limit` candidates with `raw_score = 1 - distance`.
    async fn vector_search(
        &self,
        index: &IndexName,
        query_embedding: &[f32],
        limit: usize,
        filter: &RetrievalFilter,
    ) -> Result<Vec<ScoredChunkRef>>;

    /// Order by `ts_rank_cd(content_tsv, plainto_tsquery('simple', query))`
    /// descending, apply `filter`, return up to `limit` candidates.
    async fn keyword_search(
        &self,
        index: &IndexName,
        query_text: &str,
        limit: usize,
        filter: &RetrievalFilter,
    ) -> Result<Vec<ScoredChunkRef>>;

    /// Every index name discovered by scanning the chunk-table naming
    /// pattern.
    async fn list_indexes(&self) -> Result<Vec<IndexName>>;

    /// Aggregate statistics for one index. Returns `IndexNotFound` if its
    /// chunk table is absent.
    async fn index_stats(&self, index: &IndexName) -> Result<IndexStats>;

    /// Drop the chunk table and parse-results table for `index`.
    async fn clear_index(&self, index: &IndexName) -> Result<()>;

    /// Whether `index`'s chunk table currently exists.
    async fn index_exists(&self, index: &IndexName) -> Result<bool>;
}
