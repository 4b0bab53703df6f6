//! # Domain Layer
//!
//! Pure entities, value objects, error taxonomy, and port traits shared by
//! every other CocoSearch crate. Contains no I/O: no SQL, no HTTP, no
//! filesystem access. Infrastructure crates (`cocosearch-providers`,
//! `cocosearch-language-support`) implement the ports defined here;
//! `cocosearch-application` consumes them to drive the indexing and search
//! pipelines.
//!
//! ## Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`entities`] | `Chunk`, `ParseVerdict`, `IndexName` |
//! | [`value_objects`] | `Query`, `SearchResult`, `CachedQueryResult` |
//! | [`ports`] | `Storage`, `EmbeddingProvider`, `HandlerRegistry`, `SymbolExtractor`, `ParseTracker`, `QueryCache` traits |
//! | [`constants`] | RRF `k`, cache defaults, identifier regex source |
//! | [`error`] | `CocoError` taxonomy and `Result` alias |

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use entities::{Chunk, FileParseVerdict, IndexName, ParseStatus};
pub use error::{CocoError, Result};
pub use value_objects::{CachedQueryResult, Query, SearchResult};
