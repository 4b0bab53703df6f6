//! Grammar handlers (C1): domain-specific formats layered on a base
//! language, selected by path pattern plus a content-marker check rather
//! than by extension. One example ships today — GitHub Actions workflows,
//! a YAML dialect — demonstrating the dispatch shape; more grammars can be
//! registered the same way without touching the registry.

use cocosearch_domain::ports::{ExtractedMetadata, Handler, SeparatorSpec};
use regex::Regex;
use std::sync::OnceLock;

/// A grammar handler's claim predicate: a path-pattern regex (applied to
/// the file's relative path) and an optional content-marker regex that
/// must also match before the handler is selected. Grammars with broad
/// path patterns should always carry a marker so they don't shadow a
/// sibling grammar layered on the same base extension.
pub struct GrammarClaim {
    pub path_pattern: Regex,
    pub content_marker: Option<Regex>,
}

pub struct GithubActionsHandler {
    spec: SeparatorSpec,
}

impl GithubActionsHandler {
    pub fn new() -> Self {
        Self {
            spec: SeparatorSpec {
                language: "yaml".to_string(),
                patterns: vec![r"(?m)\n  \w[\w-]*:\s*$".to_string(), r"\n\S".to_string(), r"\n\n".to_string()],
            },
        }
    }

    pub fn claim() -> GrammarClaim {
        GrammarClaim {
            path_pattern: Regex::new(r"(^|/)\.github/workflows/[^/]+\.ya?ml$").expect("valid regex"),
            content_marker: Some(Regex::new(r"(?m)^on:").expect("valid regex")),
        }
    }
}

fn job_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^  (\w[\w-]*):\s*$").expect("valid regex"))
}

impl Handler for GithubActionsHandler {
    fn name(&self) -> &str {
        "github_actions"
    }

    fn separator_spec(&self) -> &SeparatorSpec {
        &self.spec
    }

    fn extract_metadata(&self, chunk_text: &str) -> ExtractedMetadata {
        let hierarchy = job_name_pattern()
            .captures(chunk_text)
            .map(|caps| format!("jobs.{}", &caps[1]));
        ExtractedMetadata {
            block_type: hierarchy.as_ref().map(|_| "job".to_string()),
            hierarchy,
            language_id: Some("yaml".to_string()),
        }
    }
}

impl Default for GithubActionsHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_workflow_paths_only() {
        let claim = GithubActionsHandler::claim();
        assert!(claim.path_pattern.is_match(".github/workflows/ci.yml"));
        assert!(!claim.path_pattern.is_match("config/ci.yml"));
    }

    #[test]
    fn content_marker_requires_on_trigger() {
        let claim = GithubActionsHandler::claim();
        assert!(claim.content_marker.as_ref().unwrap().is_match("on:\n  push:\n"));
        assert!(!claim.content_marker.as_ref().unwrap().is_match("services:\n  db:\n"));
    }

    #[test]
    fn extracts_job_name_as_hierarchy() {
        let handler = GithubActionsHandler::new();
        let meta = handler.extract_metadata("  build:\n    runs-on: ubuntu-latest\n");
        assert_eq!(meta.hierarchy.as_deref(), Some("jobs.build"));
    }
}
