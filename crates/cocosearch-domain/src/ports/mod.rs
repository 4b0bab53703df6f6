//! Port traits: the seams infrastructure crates implement and the
//! application crate consumes. Grounded in the pack's hexagonal-style
//! `ports::providers` / `ports::repositories` split (`mcb-domain`):
//! one trait per external capability, `Send + Sync` so they can be shared
//! behind an `Arc` across the worker pool.

mod embedding;
mod handler_registry;
mod query_cache;
mod storage;
mod symbol_extractor;

pub use embedding::EmbeddingProvider;
pub use handler_registry::{Handler, HandlerRegistry, SeparatorSpec};
pub use query_cache::{CacheLookup, QueryCache};
pub use storage::{
    IndexStats, LanguageCount, ParseStatusCount, RetrievalFilter, ScoredChunkRef, Storage,
    StorageFeatures, UpsertSummary,
};
pub use symbol_extractor::{ParseVerdictClassifier, SymbolExtractor};
