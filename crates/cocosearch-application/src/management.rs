//! Index Management: enumeration, statistics, and lifecycle all delegate to
//! `Storage`'s own `information_schema` probes, kept inside `Storage`
//! rather than duplicated here to avoid a dependency cycle back from
//! `Search` into management. This module's own contribution is git-root
//! name derivation via `Repository::discover`, which walks upward from a
//! working directory to find the enclosing repository root.

use cocosearch_domain::entities::IndexName;
use cocosearch_domain::error::{CocoError, Result};
use cocosearch_domain::ports::storage::{IndexStats, Storage};
use std::path::Path;
use std::sync::Arc;

pub struct IndexManager {
    storage: Arc<dyn Storage>,
}

impl IndexManager {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn list_indexes(&self) -> Result<Vec<IndexName>> {
        self.storage.list_indexes().await
    }

    pub async fn index_stats(&self, index: &IndexName) -> Result<IndexStats> {
        self.storage.index_stats(index).await
    }

    pub async fn clear_index(&self, index: &IndexName) -> Result<()> {
        self.storage.clear_index(index).await
    }
}

/// Derive a default index name from the basename of the git toplevel
/// containing `start_dir`, sanitized to the identifier regex. Returns
/// `CocoError::validation` when `start_dir` isn't inside a git working
/// tree.
pub fn default_index_name(start_dir: &Path) -> Result<IndexName> {
    let repo = git2::Repository::discover(start_dir)
        .map_err(|e| CocoError::validation(format!("not inside a git repository: {e}")))?;
    let toplevel = repo
        .workdir()
        .ok_or_else(|| CocoError::validation("git repository has no working directory"))?;
    let basename = toplevel
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CocoError::validation("could not determine git toplevel basename"))?;
    Ok(IndexName::sanitize(basename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_git_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(default_index_name(dir.path()).is_err());
    }

    #[test]
    fn git_toplevel_basename_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let name = default_index_name(dir.path()).unwrap();
        assert!(!name.as_str().is_empty());
    }
}
