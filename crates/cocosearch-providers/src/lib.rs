//! # Providers
//!
//! Concrete adapters for the two I/O-bound domain ports that aren't
//! grammar-related: [`storage`] (C5 — Postgres/pgvector, plus the
//! storage-facing half of C10) and [`embedding`] (the Ollama-style HTTP
//! client spec §6 describes). `cocosearch-language-support` owns the
//! remaining ports (handler registry, symbol extractor, parse tracker)
//! since those are grammar-bound, not I/O-bound.

pub mod embedding;
pub mod storage;

pub use embedding::HttpEmbeddingProvider;
pub use storage::PostgresStorage;
