//! File discovery: walk `codebase_path`, honor `.gitignore` rules by
//! default, filter by include/exclude globs, and skip binary-looking
//! files via a null-byte sniff over the file's first bytes.

use cocosearch_domain::error::{CocoError, Result};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Include/exclude glob sets and the `.gitignore` toggle, as handed down
/// from the CLI collaborator's `--include`/`--exclude`/`--no-gitignore`.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub respect_gitignore: bool,
}

impl DiscoveryConfig {
    pub fn new() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// Walk `root` and return every text file's path, relative to `root`, that
/// survives the include/exclude globs and the binary sniff.
pub fn discover_files(root: &Path, config: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let mut overrides = OverrideBuilder::new(root);
    for pattern in &config.exclude {
        overrides
            .add(&format!("!{pattern}"))
            .map_err(|e| CocoError::validation(format!("invalid exclude glob '{pattern}': {e}")))?;
    }
    for pattern in &config.include {
        overrides
            .add(pattern)
            .map_err(|e| CocoError::validation(format!("invalid include glob '{pattern}': {e}")))?;
    }
    let overrides = overrides
        .build()
        .map_err(|e| CocoError::validation(format!("invalid glob set: {e}")))?;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .overrides(overrides);

    let mut files = Vec::new();
    for entry in builder.build() {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        if !is_text_file(path) {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Sniff the first 8KB for a null byte; presence of one marks the file
/// binary and excludes it from indexing.
fn is_text_file(path: &Path) -> bool {
    let Ok(mut file) = std::fs::File::open(path) else {
        return false;
    };
    let mut buf = [0u8; 8192];
    let Ok(n) = std::io::Read::read(&mut file, &mut buf) else {
        return false;
    };
    !buf[..n].contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_text_files_and_skips_binary() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "def hello(): pass\n").unwrap();
        fs::write(dir.path().join("b.bin"), [0u8, 1, 2, 0, 3]).unwrap();

        let files = discover_files(dir.path(), &DiscoveryConfig::new()).unwrap();
        assert!(files.contains(&PathBuf::from("a.py")));
        assert!(!files.contains(&PathBuf::from("b.bin")));
    }

    #[test]
    fn respects_gitignore_by_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "ignored.py\n").unwrap();
        fs::write(dir.path().join("ignored.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("kept.py"), "y = 2\n").unwrap();

        let files = discover_files(dir.path(), &DiscoveryConfig::new()).unwrap();
        assert!(!files.contains(&PathBuf::from("ignored.py")));
        assert!(files.contains(&PathBuf::from("kept.py")));
    }

    #[test]
    fn exclude_glob_removes_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("a.test.py"), "x = 1\n").unwrap();

        let config = DiscoveryConfig {
            exclude: vec!["*.test.py".to_string()],
            ..DiscoveryConfig::new()
        };
        let files = discover_files(dir.path(), &config).unwrap();
        assert!(files.contains(&PathBuf::from("a.py")));
        assert!(!files.contains(&PathBuf::from("a.test.py")));
    }
}
