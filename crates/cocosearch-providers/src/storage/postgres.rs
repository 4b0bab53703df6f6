//! [`PostgresStorage`] — the sole production [`Storage`] implementation.
//! Raw SQL throughout, grounded in the same `execute_unprepared`-style DDL
//! the teacher's sea-orm migrations use (same technique, Postgres
//! dialect): every statement is either a fixed template or one whose only
//! interpolated segment is a [`IndexName`]-derived table name, never a
//! caller-supplied string.
//!
//! `pgvector`'s wire format isn't one sqlx knows natively, so embeddings
//! travel as their bracketed text literal (`[0.1,0.2,...]`) bound as a
//! plain string and cast with `::vector` in the query text — the same
//! trick pgvector's own docs use for clients without a dedicated type
//! mapping.

use cocosearch_domain::entities::{Chunk, FileParseVerdict, IndexName};
use cocosearch_domain::error::{CocoError, Result};
use cocosearch_domain::ports::{
    IndexStats, LanguageCount, ParseStatusCount, RetrievalFilter, ScoredChunkRef, Storage,
    StorageFeatures, UpsertSummary,
};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::HashSet;

use super::table_names::{chunks_table, parse_results_table};

fn infra(err: sqlx::Error) -> CocoError {
    CocoError::infrastructure_with_source("postgres query failed", err)
}

fn vector_literal(embedding: &[f32]) -> String {
    let mut out = String::with_capacity(embedding.len() * 8 + 2);
    out.push('[');
    for (i, v) in embedding.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

fn content_hash(content_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content_text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Recover the index name embedded in a `codeindex_{name}__{name}_chunks`
/// table, rejecting anything that doesn't exactly match that template
/// (the name segment appears twice by construction, see
/// [`chunks_table`]).
fn index_name_from_chunks_table(table_name: &str) -> Option<IndexName> {
    let rest = table_name.strip_prefix("codeindex_")?.strip_suffix("_chunks")?;
    if rest.len() < 3 {
        return None;
    }
    let remaining = rest.len() - 2;
    if remaining % 2 != 0 {
        return None;
    }
    let half = remaining / 2;
    let (first, rest) = rest.split_at(half);
    let (sep, second) = rest.split_at(2);
    if sep == "__" && first == second {
        IndexName::parse(first).ok()
    } else {
        None
    }
}

fn row_to_scored_chunk(row: &sqlx::postgres::PgRow, rank: usize, score_col: &str) -> ScoredChunkRef {
    ScoredChunkRef {
        filename: row.get("filename"),
        start_byte: row.get::<i64, _>("start_byte") as usize,
        end_byte: row.get::<i64, _>("end_byte") as usize,
        language_id: row.get("language_id"),
        block_type: row.get("block_type"),
        hierarchy: row.get("hierarchy"),
        symbol_type: row.get("symbol_type"),
        symbol_name: row.get("symbol_name"),
        symbol_signature: row.get("symbol_signature"),
        rank,
        raw_score: row.get::<f32, _>(score_col),
    }
}

/// Append `filter`'s predicates to `qb`'s `WHERE` clause, skipping symbol
/// predicates entirely when `features` says this index has no symbol
/// columns (spec §4.5: "the search path must not assume symbol columns
/// ... exist").
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RetrievalFilter, features: StorageFeatures) {
    if let Some(languages) = &filter.language_ids {
        if !languages.is_empty() {
            qb.push(" AND language_id = ANY(");
            qb.push_bind(languages.clone());
            qb.push(")");
        }
    }
    if !features.has_symbol_columns {
        return;
    }
    if let Some(types) = &filter.symbol_types {
        if !types.is_empty() {
            let types: Vec<String> = types.iter().cloned().collect();
            qb.push(" AND symbol_type = ANY(");
            qb.push_bind(types);
            qb.push(")");
        }
    }
    if let Some(pattern) = &filter.symbol_name_like {
        qb.push(" AND symbol_name LIKE ");
        qb.push_bind(pattern.clone());
    }
}

/// A single process-wide `PgPool` backed [`Storage`] adapter. Column
/// presence per index is probed once and cached in `features_cache`;
/// [`PostgresStorage::reset_features_cache`] exists for tests that need to
/// re-probe after changing a table out from under the adapter.
pub struct PostgresStorage {
    pool: PgPool,
    features_cache: DashMap<String, StorageFeatures>,
}

impl PostgresStorage {
    /// Connect lazily (a real connection is only opened on first use) with
    /// a bounded pool. One of these is built once per process.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(infra)?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an already-connected pool (used by tests against a real
    /// scratch database).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool, features_cache: DashMap::new() }
    }

    /// Drop the cached column-presence bit for every index. Test-only
    /// reset primitive, per spec §4.5's "a reset primitive is provided for
    /// tests".
    pub fn reset_features_cache(&self) {
        self.features_cache.clear();
    }
}

#[async_trait::async_trait]
impl Storage for PostgresStorage {
    async fn ensure_schema(&self, index: &IndexName, embedding_dim: usize) -> Result<()> {
        let table = chunks_table(index);
        let parse_table = parse_results_table(index);

        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(infra)?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                filename TEXT NOT NULL,
                start_byte BIGINT NOT NULL,
                end_byte BIGINT NOT NULL,
                content_text TEXT NOT NULL,
                content_tsv_input TEXT NOT NULL,
                content_tsv TSVECTOR GENERATED ALWAYS AS (to_tsvector('simple', content_tsv_input)) STORED,
                embedding VECTOR({embedding_dim}) NOT NULL,
                language_id TEXT,
                block_type TEXT,
                hierarchy TEXT,
                symbol_type TEXT,
                symbol_name TEXT,
                symbol_signature TEXT,
                PRIMARY KEY (filename, start_byte, end_byte)
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(infra)?;

        for (suffix, ddl) in [
            ("embedding_idx", "USING ivfflat (embedding vector_cosine_ops) WITH (lists = 100)".to_string()),
            ("tsv_idx", "USING GIN (content_tsv)".to_string()),
            ("symbol_idx", "(symbol_type, symbol_name)".to_string()),
            ("lang_idx", "(language_id)".to_string()),
        ] {
            sqlx::query(&format!("CREATE INDEX IF NOT EXISTS {table}_{suffix} ON {table} {ddl}"))
                .execute(&self.pool)
                .await
                .map_err(infra)?;
        }

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {parse_table} (
                file_path TEXT PRIMARY KEY,
                language TEXT NOT NULL,
                parse_status TEXT NOT NULL,
                error_message TEXT
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(infra)?;

        self.features_cache.remove(index.as_str());
        Ok(())
    }

    async fn existing_content_hash(
        &self,
        index: &IndexName,
        filename: &str,
        start_byte: usize,
        end_byte: usize,
    ) -> Result<Option<String>> {
        let table = chunks_table(index);
        let row = sqlx::query(&format!(
            "SELECT content_text FROM {table} WHERE filename = $1 AND start_byte = $2 AND end_byte = $3"
        ))
        .bind(filename)
        .bind(start_byte as i64)
        .bind(end_byte as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;
        Ok(row.map(|r| content_hash(&r.get::<String, _>("content_text"))))
    }

    async fn upsert_chunks(&self, index: &IndexName, chunks: &[Chunk]) -> Result<UpsertSummary> {
        if chunks.is_empty() {
            return Ok(UpsertSummary::default());
        }
        let table = chunks_table(index);
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let mut inserted = 0usize;
        let mut updated = 0usize;

        for batch in chunks.chunks(500) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {table} (filename, start_byte, end_byte, content_text, \
                 content_tsv_input, embedding, language_id, block_type, hierarchy, \
                 symbol_type, symbol_name, symbol_signature) "
            ));
            qb.push_values(batch, |mut b, chunk| {
                b.push_bind(chunk.filename.clone())
                    .push_bind(chunk.start_byte as i64)
                    .push_bind(chunk.end_byte as i64)
                    .push_bind(chunk.content_text.clone())
                    .push_bind(chunk.content_tsv_input.clone());
                b.push_bind(vector_literal(&chunk.embedding)).push_unseparated("::vector");
                b.push_bind(chunk.language_id.clone())
                    .push_bind(chunk.block_type.clone())
                    .push_bind(chunk.hierarchy.clone())
                    .push_bind(chunk.symbol.as_ref().map(|s| s.symbol_type.clone()))
                    .push_bind(chunk.symbol.as_ref().map(|s| s.symbol_name.clone()))
                    .push_bind(chunk.symbol.as_ref().map(|s| s.symbol_signature.clone()));
            });
            qb.push(
                " ON CONFLICT (filename, start_byte, end_byte) DO UPDATE SET \
                  content_text = excluded.content_text, \
                  content_tsv_input = excluded.content_tsv_input, \
                  embedding = excluded.embedding, \
                  language_id = excluded.language_id, \
                  block_type = excluded.block_type, \
                  hierarchy = excluded.hierarchy, \
                  symbol_type = excluded.symbol_type, \
                  symbol_name = excluded.symbol_name, \
                  symbol_signature = excluded.symbol_signature \
                  RETURNING (xmax = 0) AS inserted",
            );
            let rows = qb.build().fetch_all(&mut *tx).await.map_err(infra)?;
            for row in rows {
                if row.get::<bool, _>("inserted") {
                    inserted += 1;
                } else {
                    updated += 1;
                }
            }
        }

        tx.commit().await.map_err(infra)?;
        Ok(UpsertSummary { inserted, updated, deleted: 0 })
    }

    async fn delete_chunks_not_in(&self, index: &IndexName, present_files: &[String]) -> Result<usize> {
        let table = chunks_table(index);
        let result = if present_files.is_empty() {
            sqlx::query(&format!("DELETE FROM {table}")).execute(&self.pool).await
        } else {
            sqlx::query(&format!("DELETE FROM {table} WHERE filename <> ALL($1)"))
                .bind(present_files)
                .execute(&self.pool)
                .await
        };
        Ok(result.map_err(infra)?.rows_affected() as usize)
    }

    async fn replace_parse_verdicts(&self, index: &IndexName, verdicts: &[FileParseVerdict]) -> Result<()> {
        let table = parse_results_table(index);
        let mut tx = self.pool.begin().await.map_err(infra)?;
        sqlx::query(&format!("TRUNCATE TABLE {table}")).execute(&mut *tx).await.map_err(infra)?;

        for batch in verdicts.chunks(500) {
            if batch.is_empty() {
                continue;
            }
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {table} (file_path, language, parse_status, error_message) "
            ));
            qb.push_values(batch, |mut b, verdict| {
                b.push_bind(verdict.file_path.clone())
                    .push_bind(verdict.language.clone())
                    .push_bind(verdict.parse_status.as_str())
                    .push_bind(verdict.error_message.clone());
            });
            qb.build().execute(&mut *tx).await.map_err(infra)?;
        }

        tx.commit().await.map_err(infra)?;
        Ok(())
    }

    async fn features(&self, index: &IndexName) -> Result<StorageFeatures> {
        if let Some(cached) = self.features_cache.get(index.as_str()) {
            return Ok(*cached);
        }
        let table = chunks_table(index);
        let rows = sqlx::query("SELECT column_name FROM information_schema.columns WHERE table_name = $1")
            .bind(&table)
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        let columns: HashSet<String> = rows.into_iter().map(|r| r.get::<String, _>("column_name")).collect();

        let features = StorageFeatures {
            has_symbol_columns: columns.contains("symbol_type")
                && columns.contains("symbol_name")
                && columns.contains("symbol_signature"),
            has_content_tsv: columns.contains("content_tsv"),
        };
        if !features.has_symbol_columns || !features.has_content_tsv {
            tracing::warn!(
                index = index.as_str(),
                has_symbol_columns = features.has_symbol_columns,
                has_content_tsv = features.has_content_tsv,
                "index predates hybrid search; degraded retrieval will be used for the missing columns"
            );
        }
        self.features_cache.insert(index.as_str().to_string(), features);
        Ok(features)
    }

    async fn vector_search(
        &self,
        index: &IndexName,
        query_embedding: &[f32],
        limit: usize,
        filter: &RetrievalFilter,
    ) -> Result<Vec<ScoredChunkRef>> {
        let features = self.features(index).await?;
        let table = chunks_table(index);
        let literal = vector_literal(query_embedding);

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT filename, start_byte, end_byte, language_id, block_type, hierarchy, \
             symbol_type, symbol_name, symbol_signature, 1 - (embedding <=> ",
        );
        qb.push_bind(literal.clone());
        qb.push("::vector) AS score FROM ");
        qb.push(table);
        qb.push(" WHERE true");
        push_filter(&mut qb, filter, features);
        qb.push(" ORDER BY embedding <=> ");
        qb.push_bind(literal);
        qb.push("::vector ASC LIMIT ");
        qb.push(limit.to_string());

        let rows = qb.build().fetch_all(&self.pool).await.map_err(infra)?;
        Ok(rows.iter().enumerate().map(|(rank, row)| row_to_scored_chunk(row, rank, "score")).collect())
    }

    async fn keyword_search(
        &self,
        index: &IndexName,
        query_text: &str,
        limit: usize,
        filter: &RetrievalFilter,
    ) -> Result<Vec<ScoredChunkRef>> {
        let features = self.features(index).await?;
        if !features.has_content_tsv {
            return Ok(Vec::new());
        }
        let table = chunks_table(index);

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT filename, start_byte, end_byte, language_id, block_type, hierarchy, \
             symbol_type, symbol_name, symbol_signature, \
             ts_rank_cd(content_tsv, plainto_tsquery('simple', ",
        );
        qb.push_bind(query_text.to_string());
        qb.push(")) AS score FROM ");
        qb.push(&table);
        qb.push(" WHERE content_tsv @@ plainto_tsquery('simple', ");
        qb.push_bind(query_text.to_string());
        qb.push(")");
        push_filter(&mut qb, filter, features);
        qb.push(" ORDER BY score DESC LIMIT ");
        qb.push(limit.to_string());

        let rows = qb.build().fetch_all(&self.pool).await.map_err(infra)?;
        Ok(rows.iter().enumerate().map(|(rank, row)| row_to_scored_chunk(row, rank, "score")).collect())
    }

    async fn list_indexes(&self) -> Result<Vec<IndexName>> {
        let rows = sqlx::query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name LIKE 'codeindex\\_%\\_chunks' ESCAPE '\\'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;

        let mut names: Vec<IndexName> = rows
            .into_iter()
            .filter_map(|r| index_name_from_chunks_table(&r.get::<String, _>("table_name")))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn index_stats(&self, index: &IndexName) -> Result<IndexStats> {
        if !self.index_exists(index).await? {
            return Err(CocoError::index_not_found(index.as_str()));
        }
        let table = chunks_table(index);
        let parse_table = parse_results_table(index);

        let counts = sqlx::query(&format!(
            "SELECT count(*) AS chunk_count, count(DISTINCT filename) AS file_count FROM {table}"
        ))
        .fetch_one(&self.pool)
        .await
        .map_err(infra)?;

        let size = sqlx::query("SELECT pg_total_relation_size($1::regclass) AS bytes")
            .bind(&table)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;

        let lang_rows = sqlx::query(&format!(
            "SELECT language_id, count(*) AS chunk_count FROM {table} \
             WHERE language_id IS NOT NULL GROUP BY language_id ORDER BY language_id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        let languages = lang_rows
            .into_iter()
            .map(|r| LanguageCount {
                language_id: r.get("language_id"),
                chunk_count: r.get::<i64, _>("chunk_count") as usize,
            })
            .collect();

        let status_rows = sqlx::query(&format!(
            "SELECT parse_status, count(*) AS file_count FROM {parse_table} \
             GROUP BY parse_status ORDER BY parse_status"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        let parse_statuses = status_rows
            .into_iter()
            .map(|r| ParseStatusCount {
                parse_status: r.get("parse_status"),
                file_count: r.get::<i64, _>("file_count") as usize,
            })
            .collect();

        Ok(IndexStats {
            chunk_count: counts.get::<i64, _>("chunk_count") as usize,
            file_count: counts.get::<i64, _>("file_count") as usize,
            storage_bytes: size.get::<i64, _>("bytes") as u64,
            languages,
            parse_statuses,
        })
    }

    async fn clear_index(&self, index: &IndexName) -> Result<()> {
        let table = chunks_table(index);
        let parse_table = parse_results_table(index);
        sqlx::query(&format!("DROP TABLE IF EXISTS {table} CASCADE")).execute(&self.pool).await.map_err(infra)?;
        sqlx::query(&format!("DROP TABLE IF EXISTS {parse_table} CASCADE"))
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        self.features_cache.remove(index.as_str());
        Ok(())
    }

    async fn index_exists(&self, index: &IndexName) -> Result<bool> {
        let table = chunks_table(index);
        let row = sqlx::query("SELECT to_regclass($1) IS NOT NULL AS present")
            .bind(&table)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;
        Ok(row.get("present"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_literal_formats_bracketed_csv() {
        assert_eq!(vector_literal(&[0.1, 0.2, 0.3]), "[0.1,0.2,0.3]");
    }

    #[test]
    fn vector_literal_handles_empty() {
        assert_eq!(vector_literal(&[]), "[]");
    }

    #[test]
    fn content_hash_is_stable_sha256_hex() {
        let a = content_hash("def f(): pass");
        let b = content_hash("def f(): pass");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn content_hash_differs_for_different_text() {
        assert_ne!(content_hash("a"), content_hash("b"));
    }

    #[test]
    fn recovers_index_name_from_well_formed_table() {
        let name = index_name_from_chunks_table("codeindex_myrepo__myrepo_chunks").unwrap();
        assert_eq!(name.as_str(), "myrepo");
    }

    #[test]
    fn recovers_index_name_with_underscores_in_the_name() {
        let name = index_name_from_chunks_table("codeindex_my_repo_2__my_repo_2_chunks").unwrap();
        assert_eq!(name.as_str(), "my_repo_2");
    }

    #[test]
    fn rejects_table_name_with_mismatched_halves() {
        assert!(index_name_from_chunks_table("codeindex_foo__bar_chunks").is_none());
    }

    #[test]
    fn rejects_unrelated_table_name() {
        assert!(index_name_from_chunks_table("cocosearch_parse_results_myrepo").is_none());
    }
}
