//! Index Pipeline: discovers files, chunks them, classifies parse health,
//! and upserts the result into storage with content-hash incrementality so
//! unchanged chunks skip re-embedding. Collaborators (`Storage`,
//! `EmbeddingProvider`, `HandlerRegistry`, symbol extraction) are injected
//! as `Arc<dyn Trait>` at construction; per-file errors are contained so one
//! bad file doesn't abort the whole run.

use crate::discovery::{self, DiscoveryConfig};
use cocosearch_domain::entities::{Chunk, FileParseVerdict, IndexName, SymbolInfo};
use cocosearch_domain::error::{CocoError, Result};
use cocosearch_domain::ports::embedding::EmbeddingProvider;
use cocosearch_domain::ports::handler_registry::HandlerRegistry;
use cocosearch_domain::ports::query_cache::QueryCache;
use cocosearch_domain::ports::storage::Storage;
use cocosearch_domain::ports::symbol_extractor::{ParseVerdictClassifier, SymbolExtractor};
use cocosearch_language_support::chunking;
use cocosearch_language_support::identifier_tokenize::tokenize_for_tsv;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Chunk size/overlap and include/exclude globs for one indexing run. Bytes
/// throughout, not characters, to match `Chunk`'s byte-range identity.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub respect_gitignore: bool,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Bound on concurrently in-flight embedding requests — the scarce
    /// resource that needs its own cap distinct from file-level worker
    /// count, since a single large file can itself produce more chunks
    /// than there are workers, and an embedding endpoint's own concurrency
    /// limit rarely matches the number of files being processed at once.
    pub max_concurrent_embeddings: usize,
    /// Bound on concurrently processed files.
    pub worker_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: true,
            chunk_size: 1500,
            chunk_overlap: 200,
            max_concurrent_embeddings: 8,
            worker_count: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
        }
    }
}

/// Outcome of one `run_index` call.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub chunks_inserted: usize,
    pub chunks_updated: usize,
    pub chunks_deleted: usize,
    pub elapsed_ms: u128,
    pub parse_ok: usize,
    pub parse_partial: usize,
    pub parse_error: usize,
    pub parse_no_grammar: usize,
}

/// Result of processing one file, reported back to `run_index` over a
/// [`tokio::task::JoinSet`] rather than accumulated directly, since each
/// file runs as its own task.
enum FileOutcome {
    Unreadable { filename: String, error: String },
    NoHandler { filename: String },
    Indexed { filename: String, inserted: usize, updated: usize, verdict: Option<FileParseVerdict> },
    Failed { filename: String, error: String },
}

pub struct IndexPipeline {
    storage: Arc<dyn Storage>,
    embeddings: Arc<dyn EmbeddingProvider>,
    handlers: Arc<dyn HandlerRegistry>,
    symbol_extractor: Arc<dyn SymbolExtractor>,
    parse_classifier: Arc<dyn ParseVerdictClassifier>,
    cache: Arc<dyn QueryCache>,
}

impl IndexPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        embeddings: Arc<dyn EmbeddingProvider>,
        handlers: Arc<dyn HandlerRegistry>,
        symbol_extractor: Arc<dyn SymbolExtractor>,
        parse_classifier: Arc<dyn ParseVerdictClassifier>,
        cache: Arc<dyn QueryCache>,
    ) -> Self {
        Self {
            storage,
            embeddings,
            handlers,
            symbol_extractor,
            parse_classifier,
            cache,
        }
    }

    /// Run a full or incremental indexing pass over `codebase_path`. File
    /// processing is fanned out across `config.worker_count` concurrent
    /// tasks; embedding requests across all of them share a separate
    /// semaphore capped at `config.max_concurrent_embeddings`, so a large
    /// worker count never overwhelms a slow embedding endpoint.
    pub async fn run_index(
        self: Arc<Self>,
        codebase_path: &Path,
        index_name: &IndexName,
        config: &PipelineConfig,
    ) -> Result<RunSummary> {
        let started = Instant::now();

        self.embeddings.prewarm().await?;
        self.storage.ensure_schema(index_name, self.embeddings.dimension()).await?;

        let discovery_config = DiscoveryConfig {
            include: config.include.clone(),
            exclude: config.exclude.clone(),
            respect_gitignore: config.respect_gitignore,
        };
        let relative_files = discovery::discover_files(codebase_path, &discovery_config)?;

        let mut summary = RunSummary {
            files_scanned: relative_files.len(),
            ..Default::default()
        };
        let mut verdicts = Vec::new();
        let mut present_files = Vec::new();

        let worker_permits = Arc::new(tokio::sync::Semaphore::new(config.worker_count.max(1)));
        let embedding_permits = Arc::new(tokio::sync::Semaphore::new(config.max_concurrent_embeddings.max(1)));
        let mut tasks = tokio::task::JoinSet::new();

        for relative in &relative_files {
            let pipeline = self.clone();
            let worker_permits = worker_permits.clone();
            let embedding_permits = embedding_permits.clone();
            let codebase_path = codebase_path.to_path_buf();
            let relative = relative.clone();
            let index_name = index_name.clone();
            let config = config.clone();

            tasks.spawn(async move {
                let _permit = worker_permits.acquire_owned().await.ok();
                pipeline.process_one_file(&codebase_path, &relative, &index_name, &config, &embedding_permits).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    warn!(error = %join_err, "file-indexing task panicked");
                    continue;
                }
            };
            match outcome {
                FileOutcome::Unreadable { filename, error } => {
                    warn!(file = %filename, %error, "skipping unreadable file");
                    summary.files_skipped += 1;
                }
                FileOutcome::NoHandler { filename } => {
                    present_files.push(filename);
                    summary.files_skipped += 1;
                }
                FileOutcome::Indexed { filename, inserted, updated, verdict } => {
                    present_files.push(filename);
                    summary.files_indexed += 1;
                    summary.chunks_inserted += inserted;
                    summary.chunks_updated += updated;
                    if let Some(verdict) = verdict {
                        tally_verdict(&mut summary, &verdict);
                        verdicts.push(verdict);
                    }
                }
                FileOutcome::Failed { filename, error } => {
                    present_files.push(filename.clone());
                    warn!(file = %filename, %error, "skipping file after indexing error");
                    summary.files_skipped += 1;
                }
            }
        }

        let deleted = self.storage.delete_chunks_not_in(index_name, &present_files).await?;
        summary.chunks_deleted = deleted;

        self.storage.replace_parse_verdicts(index_name, &verdicts).await?;
        self.cache.invalidate_index(index_name.as_str()).await?;

        summary.elapsed_ms = started.elapsed().as_millis();
        info!(
            index = index_name.as_str(),
            files = summary.files_indexed,
            inserted = summary.chunks_inserted,
            updated = summary.chunks_updated,
            deleted = summary.chunks_deleted,
            "index run complete"
        );
        Ok(summary)
    }

    /// Read, chunk, and upsert one file, then classify its parse health.
    /// Kept as a single unit of work dispatched onto the worker semaphore —
    /// errors at any step are captured in the returned [`FileOutcome`]
    /// rather than propagated, so one bad file never aborts the run.
    async fn process_one_file(
        &self,
        codebase_path: &Path,
        relative: &Path,
        index_name: &IndexName,
        config: &PipelineConfig,
        embedding_permits: &Arc<tokio::sync::Semaphore>,
    ) -> FileOutcome {
        let filename = relative.to_string_lossy().replace('\\', "/");
        let absolute = codebase_path.join(relative);

        let content = match std::fs::read_to_string(&absolute) {
            Ok(content) => content,
            Err(err) => return FileOutcome::Unreadable { filename, error: err.to_string() },
        };

        let Some(handler) = self.handlers.get_handler(relative, Some(&content)) else {
            return FileOutcome::NoHandler { filename };
        };

        match self
            .index_one_file(index_name, &filename, &content, handler, config, embedding_permits)
            .await
        {
            Ok((inserted, updated)) => {
                let verdict = self.classify_parse_health(&filename, &content);
                FileOutcome::Indexed { filename, inserted, updated, verdict }
            }
            Err(err) => FileOutcome::Failed { filename, error: err.to_string() },
        }
    }

    /// Chunk, re-embed changed spans, and upsert one file. Spans whose
    /// content hash matches the stored row are left out of the batch
    /// entirely: the decision whether to re-embed a chunk is based on
    /// byte-range identity plus content hash, so matching rows are left
    /// untouched. Each `embed()` call acquires a permit from the shared
    /// in-flight-embeddings semaphore first.
    async fn index_one_file(
        &self,
        index_name: &IndexName,
        filename: &str,
        content: &str,
        handler: &dyn cocosearch_domain::ports::handler_registry::Handler,
        config: &PipelineConfig,
        embedding_permits: &Arc<tokio::sync::Semaphore>,
    ) -> Result<(usize, usize)> {
        let spans = chunking::split(content, handler.separator_spec(), config.chunk_size, config.chunk_overlap);
        let file_size = content.len();
        let mut chunks = Vec::with_capacity(spans.len());

        for span in spans {
            let chunk_text = &content[span.start..span.end];
            if chunk_text.trim().is_empty() {
                continue;
            }

            let content_hash = hash_content(chunk_text);
            let existing_hash = self
                .storage
                .existing_content_hash(index_name, filename, span.start, span.end)
                .await?;
            if existing_hash.as_deref() == Some(content_hash.as_str()) {
                continue;
            }

            let metadata = handler.extract_metadata(chunk_text);
            let language_id = metadata.language_id.clone();
            let embedding = {
                let _permit = embedding_permits
                    .acquire()
                    .await
                    .map_err(|e| CocoError::infrastructure(format!("embedding semaphore closed: {e}")))?;
                self.embeddings.embed(chunk_text).await?
            };
            let symbol: Option<SymbolInfo> = language_id
                .as_deref()
                .and_then(|lang| self.symbol_extractor.extract(lang, chunk_text));
            let content_tsv_input = tokenize_for_tsv(chunk_text);

            let chunk = Chunk::new(
                filename.to_string(),
                span.start,
                span.end,
                file_size,
                chunk_text.to_string(),
                content_tsv_input,
                embedding,
                language_id,
                metadata.block_type,
                metadata.hierarchy,
                symbol,
            )?;
            chunks.push(chunk);
        }

        if chunks.is_empty() {
            return Ok((0, 0));
        }
        let summary = self.storage.upsert_chunks(index_name, &chunks).await?;
        Ok((summary.inserted, summary.updated))
    }

    fn classify_parse_health(&self, filename: &str, content: &str) -> Option<FileParseVerdict> {
        let language = infer_language_from_extension(filename).unwrap_or("");
        self.parse_classifier.classify(filename, language, content)
    }
}

fn infer_language_from_extension(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit('.').next()?.to_lowercase();
    Some(match ext.as_str() {
        "py" | "pyi" => "python",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "rs" => "rust",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => "cpp",
        "rb" => "ruby",
        "php" => "php",
        _ => return None,
    })
}

fn tally_verdict(summary: &mut RunSummary, verdict: &FileParseVerdict) {
    use cocosearch_domain::entities::ParseStatus;
    match verdict.parse_status {
        ParseStatus::Ok => summary.parse_ok += 1,
        ParseStatus::Partial => summary.parse_partial += 1,
        ParseStatus::Error => summary.parse_error += 1,
        ParseStatus::NoGrammar => summary.parse_no_grammar += 1,
    }
}

fn hash_content(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
