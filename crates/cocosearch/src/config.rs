//! Configuration resolution: compiled defaults < environment < config file
//! < CLI flags. CLI flags override the config file; the config file
//! overrides environment variables; environment variables override
//! compiled defaults.
//!
//! This module owns only the *merging*; `main.rs` applies each subcommand's
//! CLI flags as the final override step since clap already parsed them.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// `indexing.*` block of the YAML config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndexingSection {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
}

/// Top-level shape of `cocosearch.yml` / `cocosearch.yaml` in the project
/// root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(rename = "indexName")]
    pub index_name: Option<String>,
    pub indexing: IndexingSection,
}

impl ConfigFile {
    /// Load `cocosearch.yml`/`cocosearch.yaml` from `project_root` if
    /// present. A missing file is not an error — every field simply stays
    /// at its default, yielding to environment and compiled defaults.
    pub fn load(project_root: &Path) -> Self {
        for name in ["cocosearch.yml", "cocosearch.yaml"] {
            let path = project_root.join(name);
            if let Ok(text) = std::fs::read_to_string(&path) {
                match serde_yaml::from_str(&text) {
                    Ok(config) => return config,
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "ignoring malformed config file");
                    }
                }
            }
        }
        Self::default()
    }
}

/// Resolved runtime configuration: environment variables read once at
/// startup.
pub struct EnvConfig {
    pub database_url: Option<String>,
    pub ollama_url: Option<String>,
    pub index_name: Option<String>,
    pub project: Option<PathBuf>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("COCOSEARCH_DATABASE_URL").ok(),
            ollama_url: std::env::var("COCOSEARCH_OLLAMA_URL").ok(),
            index_name: std::env::var("COCOSEARCH_INDEX_NAME").ok(),
            project: std::env::var("COCOSEARCH_PROJECT").ok().map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigFile::load(dir.path());
        assert!(config.index_name.is_none());
        assert!(config.indexing.include_patterns.is_empty());
    }

    #[test]
    fn loads_indexing_section_and_index_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cocosearch.yml"),
            "indexName: myrepo\nindexing:\n  include_patterns:\n    - \"**/*.py\"\n  chunk_size: 800\n",
        )
        .unwrap();
        let config = ConfigFile::load(dir.path());
        assert_eq!(config.index_name.as_deref(), Some("myrepo"));
        assert_eq!(config.indexing.include_patterns, vec!["**/*.py".to_string()]);
        assert_eq!(config.indexing.chunk_size, Some(800));
    }

    #[test]
    fn malformed_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cocosearch.yml"), "not: [valid: yaml").unwrap();
        let config = ConfigFile::load(dir.path());
        assert!(config.index_name.is_none());
    }
}
