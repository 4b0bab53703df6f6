//! Error taxonomy for the CocoSearch core.
//!
//! One variant per error *kind* named in the spec, not per type — callers
//! match on the kind, not on which component raised it. Messages are
//! human-grade and stable enough to assert against in tests (they include
//! the failing artifact: file path, index name, or truncated query text).

use thiserror::Error;

/// Result type alias used throughout the core.
pub type Result<T> = std::result::Result<T, CocoError>;

/// Maximum query length accepted before a `ValidationError` is raised.
pub const MAX_QUERY_LEN: usize = 10_000;

/// Taxonomy of errors the core can surface.
#[derive(Error, Debug)]
pub enum CocoError {
    /// Malformed index name, impossible flag combination, or an
    /// over-length query. No retry; surfaced directly to the caller.
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable description, always mentioning the failing field.
        message: String,
    },

    /// The chunk table for the requested index does not exist.
    #[error("index not found: {index_name}")]
    IndexNotFound {
        /// The index name that was looked up.
        index_name: String,
    },

    /// The embedding endpoint or storage backend is unreachable.
    #[error("infrastructure error: {message}")]
    Infrastructure {
        /// Description including a remediation hint where possible.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Partial retrieval failure in the hybrid search pipeline (e.g. the
    /// keyword path raised while the vector path succeeded).
    #[error("search error: {message}")]
    Search {
        /// Description of what failed and what was returned instead.
        message: String,
    },

    /// Search was cancelled between retrieval and fusion.
    #[error("search cancelled")]
    SearchCancelled,

    /// Per-file error during indexing (read, parse, or embed). Logged and
    /// counted by the pipeline; the run continues.
    #[error("indexing error for {file_path}: {message}")]
    Indexing {
        /// Path of the file that failed.
        file_path: String,
        /// Description of the failure.
        message: String,
    },
}

impl CocoError {
    /// Build a [`CocoError::Validation`] with a message mentioning the field.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// Build a [`CocoError::IndexNotFound`].
    pub fn index_not_found(index_name: impl Into<String>) -> Self {
        Self::IndexNotFound { index_name: index_name.into() }
    }

    /// Build a [`CocoError::Infrastructure`] with no source error attached.
    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure { message: message.into(), source: None }
    }

    /// Build a [`CocoError::Infrastructure`] wrapping an underlying source.
    pub fn infrastructure_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Infrastructure { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Build a [`CocoError::Search`].
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search { message: message.into() }
    }

    /// Build a [`CocoError::Indexing`] error for a specific file.
    pub fn indexing(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Indexing { file_path: file_path.into(), message: message.into() }
    }

    /// Truncate a query string to 200 chars for inclusion in error messages,
    /// per spec's error-message stability requirement.
    pub fn truncate_query(query: &str) -> String {
        if query.chars().count() <= 200 {
            query.to_string()
        } else {
            let truncated: String = query.chars().take(200).collect();
            format!("{truncated}…")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_query_passes_short_strings_through() {
        assert_eq!(CocoError::truncate_query("parse"), "parse");
    }

    #[test]
    fn truncate_query_caps_at_200_chars_with_ellipsis() {
        let long = "a".repeat(250);
        let truncated = CocoError::truncate_query(&long);
        assert_eq!(truncated.chars().count(), 201);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn validation_error_message_mentions_index_name() {
        let err = CocoError::validation("index name '1my-proj' must match ^[a-z][a-z0-9_]*$");
        assert!(err.to_string().contains("index name"));
    }
}
