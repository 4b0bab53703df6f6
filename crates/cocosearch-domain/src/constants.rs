//! Domain-level constants.
//!
//! Pulled out of the algorithms that use them so they can be referenced from
//! tests and documentation without duplicating magic numbers. Per the
//! spec's design notes, `RRF_K` is a fixed constant, not a tunable, absent
//! an evaluation harness.

/// Reciprocal Rank Fusion damping constant. Fixed by spec, not configurable.
pub const RRF_K: f64 = 60.0;

/// Regex source for a valid index identifier: lowercase, starts with a
/// letter, rest alphanumeric/underscore.
pub const INDEX_NAME_PATTERN: &str = r"^[a-z][a-z0-9_]*$";

/// Hard cap on lines returned by context expansion, regardless of mode.
pub const MAX_CONTEXT_LINES: usize = 50;

/// Default `context_before`/`context_after` line counts when smart context
/// degrades to explicit mode after a parse failure.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Default query cache capacity (LRU entries).
pub const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Default query cache entry TTL, in seconds (24 hours).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Minimum cosine similarity for a semantic cache hit.
pub const SEMANTIC_CACHE_THRESHOLD: f32 = 0.92;

/// Default per-request timeout for the embedding endpoint, in seconds.
pub const EMBEDDING_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Session-scoped pre-warm timeout for the embedding endpoint's first call.
pub const EMBEDDING_PREWARM_TIMEOUT_SECS: u64 = 60;

/// Maximum bounded file-content LRU size for context expansion.
pub const MIN_CONTEXT_FILE_CACHE_CAPACITY: usize = 128;

/// Maximum line length before truncation in formatted context output.
pub const MAX_CONTEXT_LINE_CHARS: usize = 200;

/// File extensions excluded from parse tracking entirely (text-only formats).
pub const PARSE_TRACKING_EXCLUDED_EXTENSIONS: &[&str] =
    &["md", "mdx", "yaml", "yml", "json", "toml", "xml", "dtd", "csv", "txt"];
