//! [`IndexName`] — the validated identifier every table name is derived
//! from. Constructing one is the only way to get a value that storage is
//! allowed to interpolate into DDL/DML.

use crate::constants::INDEX_NAME_PATTERN;
use crate::error::{CocoError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(INDEX_NAME_PATTERN).expect("index name pattern is valid regex"))
}

/// A lowercase identifier naming an index, validated against
/// `^[a-z][a-z0-9_]*$`. Table names are derived by formatting this value
/// into fixed templates (see `cocosearch-providers::storage`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexName(String);

impl IndexName {
    /// Validate and wrap `name`. Rejects anything not matching
    /// `^[a-z][a-z0-9_]*$`, per spec §3 (Index).
    pub fn parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !pattern().is_match(&name) {
            return Err(CocoError::validation(format!(
                "invalid index name '{name}': must match ^[a-z][a-z0-9_]*$"
            )));
        }
        Ok(Self(name))
    }

    /// Sanitize an arbitrary string (e.g. a git toplevel basename) into a
    /// valid index name: lowercase, non-alnum runs become `_`, and a
    /// leading digit gets an `i` prefix. Used by C10's default-name
    /// derivation; never used to validate caller-supplied names.
    pub fn sanitize(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        let mut last_was_sep = false;
        for ch in raw.to_lowercase().chars() {
            if ch.is_ascii_alphanumeric() {
                out.push(ch);
                last_was_sep = false;
            } else if !last_was_sep {
                out.push('_');
                last_was_sep = true;
            }
        }
        let trimmed = out.trim_matches('_').to_string();
        let candidate =
            if trimmed.is_empty() { "index".to_string() } else { trimmed };
        let candidate = if candidate.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            format!("i{candidate}")
        } else {
            candidate
        };
        Self::parse(candidate).unwrap_or_else(|_| Self("index".to_string()))
    }

    /// Borrow the underlying identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IndexName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_leading_digit() {
        let err = IndexName::parse("1my-proj").unwrap_err();
        assert!(err.to_string().contains("index name"));
    }

    #[test]
    fn rejects_uppercase() {
        assert!(IndexName::parse("MyProj").is_err());
    }

    #[test]
    fn accepts_valid_identifier() {
        let name = IndexName::parse("my_proj2").unwrap();
        assert_eq!(name.as_str(), "my_proj2");
    }

    #[test]
    fn sanitize_handles_dashes_and_leading_digit() {
        let name = IndexName::sanitize("123-My-Repo!!");
        assert_eq!(name.as_str(), "i123_my_repo");
    }
}
