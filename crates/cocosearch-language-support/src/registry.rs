//! [`StaticHandlerRegistry`] — the compile-time registered table REDESIGN
//! FLAG calls for: handlers are built once from [`languages::builtin_handlers`]
//! and [`grammars`], not discovered by scanning a directory at runtime.
//! Extension conflicts are still detected and still fatal, just at
//! `StaticHandlerRegistry::new()` time instead of process-start directory
//! scan time.

use crate::grammars::{GithubActionsHandler, GrammarClaim};
use crate::languages::{self, LanguageHandler};
use cocosearch_domain::error::{CocoError, Result};
use cocosearch_domain::ports::{Handler, HandlerRegistry, SeparatorSpec};
use std::collections::HashMap;
use std::path::Path;

struct GrammarEntry {
    handler: Box<dyn Handler>,
    claim: GrammarClaim,
}

/// The registry built from [`languages::builtin_handlers`] plus the
/// registered grammar handlers. Construct once per process with
/// [`StaticHandlerRegistry::new`]; extension conflicts fail construction.
pub struct StaticHandlerRegistry {
    language_handlers: Vec<LanguageHandler>,
    ext_index: HashMap<String, usize>,
    grammars: Vec<GrammarEntry>,
}

impl StaticHandlerRegistry {
    /// Build the registry. Fails if two built-in language handlers claim
    /// the same extension — a configuration bug, not a per-file condition.
    pub fn new() -> Result<Self> {
        let language_handlers = languages::builtin_handlers();
        let mut ext_index = HashMap::new();
        for (idx, handler) in language_handlers.iter().enumerate() {
            for ext in handler.extensions() {
                if let Some(&existing) = ext_index.get(*ext) {
                    let other: &LanguageHandler = &language_handlers[existing];
                    return Err(CocoError::validation(format!(
                        "extension conflict on '.{ext}': handlers '{}' and '{}' both claim it",
                        other.name(),
                        handler.name()
                    )));
                }
                ext_index.insert(ext.to_string(), idx);
            }
        }

        let grammars = vec![GrammarEntry {
            handler: Box::new(GithubActionsHandler::new()),
            claim: GithubActionsHandler::claim(),
        }];

        Ok(Self { language_handlers, ext_index, grammars })
    }

    fn extension_of(path: &Path) -> Option<String> {
        path.extension().map(|e| e.to_string_lossy().to_lowercase())
    }
}

impl HandlerRegistry for StaticHandlerRegistry {
    fn get_handler(&self, filepath: &Path, content: Option<&str>) -> Option<&dyn Handler> {
        let path_str = filepath.to_string_lossy();
        for grammar in &self.grammars {
            if !grammar.claim.path_pattern.is_match(&path_str) {
                continue;
            }
            match (&grammar.claim.content_marker, content) {
                (None, _) => return Some(grammar.handler.as_ref()),
                (Some(marker), Some(text)) if marker.is_match(text) => {
                    return Some(grammar.handler.as_ref());
                }
                _ => continue,
            }
        }

        let ext = Self::extension_of(filepath)?;
        let idx = *self.ext_index.get(&ext)?;
        Some(&self.language_handlers[idx] as &dyn Handler)
    }

    fn all_custom_language_specs(&self) -> Vec<SeparatorSpec> {
        self.language_handlers.iter().map(|h| h.separator_spec().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_python_by_extension() {
        let registry = StaticHandlerRegistry::new().unwrap();
        let handler = registry.get_handler(Path::new("src/main.py"), None).unwrap();
        assert_eq!(handler.name(), "python");
    }

    #[test]
    fn unknown_extension_returns_none() {
        let registry = StaticHandlerRegistry::new().unwrap();
        assert!(registry.get_handler(Path::new("asset.bin"), None).is_none());
    }

    #[test]
    fn workflow_yaml_prefers_grammar_handler_over_plain_yaml() {
        let registry = StaticHandlerRegistry::new().unwrap();
        let handler = registry
            .get_handler(Path::new(".github/workflows/ci.yml"), Some("on:\n  push:\n"))
            .unwrap();
        assert_eq!(handler.name(), "github_actions");
    }

    #[test]
    fn workflow_yaml_without_marker_falls_back_to_plain_yaml() {
        let registry = StaticHandlerRegistry::new().unwrap();
        let handler = registry
            .get_handler(Path::new(".github/workflows/ci.yml"), Some("services:\n  db:\n"))
            .unwrap();
        assert_eq!(handler.name(), "yaml");
    }

    #[test]
    fn all_custom_language_specs_covers_every_builtin() {
        let registry = StaticHandlerRegistry::new().unwrap();
        assert_eq!(registry.all_custom_language_specs().len(), languages::builtin_handlers().len());
    }
}
