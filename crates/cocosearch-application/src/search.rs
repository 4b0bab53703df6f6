//! C7 — Hybrid Search Engine. Orchestrates C9 (cache), C6 (analysis),
//! C5/Storage (retrieval), this crate's `rrf` (fusion), and C8 (context
//! expansion). Grounded in `codex-rs/retrieval/src/search/hybrid.rs`'s
//! `HybridSearcher` shape (vector + keyword dispatched together, fused,
//! then post-processed) and in `ArtemisMucaj-codesearch`'s use-case style of
//! holding every collaborator behind `Arc<dyn Trait>`.

use crate::cache;
use crate::cancellation::CancellationToken;
use crate::context::ContextExpander;
use crate::fingerprint;
use crate::glob::{self, SymbolNamePattern};
use crate::language_alias;
use crate::query_analyzer::{self, QueryClass};
use crate::rrf;
use cocosearch_domain::error::{CocoError, Result};
use cocosearch_domain::ports::embedding::EmbeddingProvider;
use cocosearch_domain::ports::query_cache::{CacheLookup, QueryCache};
use cocosearch_domain::ports::storage::{RetrievalFilter, ScoredChunkRef, Storage, StorageFeatures};
use cocosearch_domain::value_objects::{CachedQueryResult, Query, SearchResult};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

const DEFAULT_MIN_RETRIEVAL_LIMIT: usize = 40;

/// The C7 search engine. One instance is constructed per process (or per
/// test) and reused across `search()` calls; its context-file cache is
/// cleared at the end of each call rather than torn down.
pub struct SearchEngine {
    storage: Arc<dyn Storage>,
    embeddings: Arc<dyn EmbeddingProvider>,
    cache: Arc<dyn QueryCache>,
    codebase_root: PathBuf,
}

impl SearchEngine {
    pub fn new(
        storage: Arc<dyn Storage>,
        embeddings: Arc<dyn EmbeddingProvider>,
        cache: Arc<dyn QueryCache>,
        codebase_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            embeddings,
            cache,
            codebase_root: codebase_root.into(),
        }
    }

    pub async fn search(&self, query: &Query) -> Result<Vec<SearchResult>> {
        self.search_cancellable(query, None).await
    }

    pub async fn search_cancellable(
        &self,
        query: &Query,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Vec<SearchResult>> {
        if !self.storage.index_exists(&query.index_name).await? {
            return Err(CocoError::index_not_found(query.index_name.as_str()));
        }

        let class = query_analyzer::classify(&query.text);
        let resolved_hybrid = query.use_hybrid.unwrap_or_else(|| class.default_use_hybrid());

        let exact_key = fingerprint::exact_fingerprint(query, resolved_hybrid);
        let filter_key = fingerprint::filter_key(query, resolved_hybrid);

        if !query.no_cache {
            if let Some(results) = self.probe_cache(&exact_key, &filter_key, None).await {
                return Ok(results);
            }
        }

        let features = self.storage.features(&query.index_name).await?;

        if let Some(symbol_types) = &query.symbol_type {
            if !features.has_symbol_columns {
                warn!(index = query.index_name.as_str(), "symbol filter requested on index without symbol columns; returning empty");
                let _ = symbol_types;
                return Ok(Vec::new());
            }
        }

        let query_embedding = self.embeddings.embed(&query.text).await?;

        if !query.no_cache {
            if let Some(results) = self.probe_cache(&exact_key, &filter_key, Some(&query_embedding)).await {
                return Ok(results);
            }
        }

        let use_hybrid = resolved_hybrid && features.has_content_tsv;
        if resolved_hybrid && !features.has_content_tsv {
            warn!(index = query.index_name.as_str(), "hybrid requested but index lacks content_tsv; degrading to vector-only");
        }

        let filter = build_filter(query, &features);
        let retrieval_limit = (query.limit * 4).max(DEFAULT_MIN_RETRIEVAL_LIMIT);

        if cancellation.is_some_and(CancellationToken::is_cancelled) {
            return Err(CocoError::SearchCancelled);
        }

        let vector_future = self.storage.vector_search(&query.index_name, &query_embedding, retrieval_limit, &filter);
        let keyword_future = async {
            if use_hybrid {
                self.storage.keyword_search(&query.index_name, &query.text, retrieval_limit, &filter).await
            } else {
                Ok(Vec::new())
            }
        };
        let (vector_ranked, keyword_ranked) = tokio::try_join!(vector_future, keyword_future)?;

        if cancellation.is_some_and(CancellationToken::is_cancelled) {
            return Err(CocoError::SearchCancelled);
        }

        let fused = rrf::fuse(vector_ranked, keyword_ranked);
        let fused = post_filter_symbol_name(fused, query.symbol_name.as_deref());
        let rescaled = rescale(fused);

        let truncated: Vec<(f32, ScoredChunkRef)> = rescaled
            .into_iter()
            .filter(|(score, _)| *score >= query.min_score)
            .take(query.limit)
            .collect();

        let expander = ContextExpander::new();
        let mut results = Vec::with_capacity(truncated.len());
        for (score, chunk) in truncated {
            if let Some(result) = self.build_result(&expander, query, score, chunk) {
                results.push(result);
            }
        }
        expander.clear();

        if !query.no_cache {
            let entry = CachedQueryResult::new(
                exact_key,
                query.index_name.as_str(),
                filter_key,
                chrono::Utc::now(),
                results.clone(),
                Some(query_embedding),
            );
            self.cache.put(entry).await?;
        }

        Ok(results)
    }

    async fn probe_cache(&self, exact_key: &str, filter_key: &str, embedding: Option<&[f32]>) -> Option<Vec<SearchResult>> {
        match self.cache.get(exact_key, filter_key, embedding).await {
            CacheLookup::Exact(entry) | CacheLookup::Semantic(entry) => Some(entry.results),
            CacheLookup::Miss => None,
        }
    }

    fn build_result(
        &self,
        expander: &ContextExpander,
        query: &Query,
        score: f32,
        chunk: ScoredChunkRef,
    ) -> Option<SearchResult> {
        let expanded = if query.smart_context || query.context_before.is_some() {
            expander.expand(
                &self.codebase_root,
                &chunk.filename,
                chunk.language_id.as_deref(),
                chunk.start_byte,
                chunk.end_byte,
                query.smart_context,
                query.context_before,
                query.context_after,
            )
        } else {
            None
        };

        let (context_before, context_after) = match expanded {
            Some(window) => (Some(window.context_before), Some(window.context_after)),
            None => (None, None),
        };

        Some(SearchResult {
            filename: chunk.filename,
            start_byte: chunk.start_byte,
            end_byte: chunk.end_byte,
            score,
            language_id: chunk.language_id,
            block_type: chunk.block_type,
            hierarchy: chunk.hierarchy,
            symbol_type: chunk.symbol_type,
            symbol_name: chunk.symbol_name,
            symbol_signature: chunk.symbol_signature,
            context_before,
            context_after,
        })
    }
}

fn build_filter(query: &Query, features: &StorageFeatures) -> RetrievalFilter {
    let language_ids = query
        .language_filter
        .as_ref()
        .map(|langs| language_alias::expand_all(langs));

    let symbol_types = if features.has_symbol_columns {
        query.symbol_type.clone()
    } else {
        None
    };

    let symbol_name_like = if features.has_symbol_columns {
        query.symbol_name.as_deref().and_then(|glob| match glob::translate(glob) {
            SymbolNamePattern::Like(pattern) => Some(pattern),
            SymbolNamePattern::Regex(_) => None,
        })
    } else {
        None
    };

    RetrievalFilter {
        language_ids,
        symbol_types,
        symbol_name_like,
    }
}

/// Regex-class globs (`[A-Z]*Handler`) can't be pushed into storage's
/// `LIKE`-only filter, so they're applied here against the fused list.
fn post_filter_symbol_name(fused: Vec<rrf::FusedChunk>, symbol_name: Option<&str>) -> Vec<rrf::FusedChunk> {
    let Some(glob) = symbol_name else { return fused };
    let SymbolNamePattern::Regex(pattern) = glob::translate(glob) else {
        return fused;
    };
    let Ok(re) = Regex::new(&pattern) else { return fused };
    fused
        .into_iter()
        .filter(|f| f.chunk.symbol_name.as_deref().is_some_and(|name| re.is_match(name)))
        .collect()
}

/// Rescale fused scores to `[0, 1]` by dividing by the batch's best score.
fn rescale(fused: Vec<rrf::FusedChunk>) -> Vec<(f32, ScoredChunkRef)> {
    let best = fused.iter().map(|f| f.score).fold(0.0_f32, f32::max);
    if best <= 0.0 {
        return fused.into_iter().map(|f| (0.0, f.chunk)).collect();
    }
    fused.into_iter().map(|f| (f.score / best, f.chunk)).collect()
}
