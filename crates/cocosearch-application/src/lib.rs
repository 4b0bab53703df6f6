//! # Application Layer
//!
//! Indexing and search orchestration over the domain's port traits, split
//! across the two pipelines: building an index and answering a query. No
//! concrete I/O lives here — `cocosearch-providers` and
//! `cocosearch-language-support` supply the trait implementations this
//! crate's orchestration code is generic over.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`pipeline`] | `IndexPipeline::run_index`, incremental by content hash |
//! | [`discovery`] | `.gitignore`-aware file walk, binary sniff |
//! | [`query_analyzer`] | conceptual / identifier-heavy / mixed query classification |
//! | [`search`] | `SearchEngine::search`, cache → embed → retrieve → fuse → expand |
//! | [`rrf`] | fixed-`k` reciprocal rank fusion |
//! | [`language_alias`] | `ts` → `typescript`-style expansion |
//! | [`glob`] | `symbol_name` glob → `LIKE`/regex translation |
//! | [`context`] | smart + explicit context expansion, bounded file LRU |
//! | [`cache`] | moka-backed two-level (exact + semantic) query cache |
//! | [`fingerprint`] | exact-key and semantic-scope fingerprinting |
//! | [`management`] | index enumeration/stats/clear delegation, git-root naming |
//! | [`cancellation`] | cooperative cancellation token for in-flight searches |

pub mod cache;
pub mod cancellation;
pub mod context;
pub mod discovery;
pub mod fingerprint;
pub mod glob;
pub mod language_alias;
pub mod management;
pub mod pipeline;
pub mod query_analyzer;
pub mod rrf;
pub mod search;

pub use cache::MokaQueryCache;
pub use context::ContextExpander;
pub use management::IndexManager;
pub use pipeline::{IndexPipeline, PipelineConfig, RunSummary};
pub use query_analyzer::QueryClass;
pub use search::SearchEngine;
