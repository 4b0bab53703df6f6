//! The per-file parse-verdict entity produced by C3 (Parse Tracker).

use serde::{Deserialize, Serialize};

/// Classification of a file's parse health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    /// Parsed with a clean tree: no error or missing nodes.
    Ok,
    /// Parsed, but the tree contains error/missing nodes.
    Partial,
    /// The parser raised.
    Error,
    /// No grammar registered for this file's language.
    NoGrammar,
}

impl ParseStatus {
    /// Lowercase wire form used as the `parse_status` column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStatus::Ok => "ok",
            ParseStatus::Partial => "partial",
            ParseStatus::Error => "error",
            ParseStatus::NoGrammar => "no_grammar",
        }
    }
}

impl std::fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per indexed file path. Text-only formats (markdown, YAML,
/// JSON, TOML, ...) never produce a row: absence means "skipped from
/// parse tracking", not "unknown".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileParseVerdict {
    pub file_path: String,
    /// Tree-sitter language name, e.g. `python`.
    pub language: String,
    pub parse_status: ParseStatus,
    pub error_message: Option<String>,
}

impl FileParseVerdict {
    /// Build an `ok` verdict.
    pub fn ok(file_path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            language: language.into(),
            parse_status: ParseStatus::Ok,
            error_message: None,
        }
    }

    /// Build a `no_grammar` verdict — no parser map entry for this language.
    pub fn no_grammar(file_path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            language: language.into(),
            parse_status: ParseStatus::NoGrammar,
            error_message: None,
        }
    }

    /// Build an `error` verdict — the parser raised.
    pub fn error(
        file_path: impl Into<String>,
        language: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            language: language.into(),
            parse_status: ParseStatus::Error,
            error_message: Some(error_message.into()),
        }
    }

    /// Build a `partial` verdict from up to ten 1-indexed error line numbers,
    /// suffixing `(+N more)` when there were more than ten.
    pub fn partial(
        file_path: impl Into<String>,
        language: impl Into<String>,
        error_lines: &[usize],
    ) -> Self {
        let shown: Vec<String> = error_lines.iter().take(10).map(|l| l.to_string()).collect();
        let mut message = shown.join(", ");
        if error_lines.len() > 10 {
            message.push_str(&format!(" (+{} more)", error_lines.len() - 10));
        }
        Self {
            file_path: file_path.into(),
            language: language.into(),
            parse_status: ParseStatus::Partial,
            error_message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_caps_at_ten_lines_with_suffix() {
        let lines: Vec<usize> = (1..=15).collect();
        let verdict = FileParseVerdict::partial("a.py", "python", &lines);
        let msg = verdict.error_message.unwrap();
        assert!(msg.starts_with("1, 2, 3, 4, 5, 6, 7, 8, 9, 10"));
        assert!(msg.ends_with("(+5 more)"));
    }

    #[test]
    fn partial_with_five_lines_omits_suffix() {
        let verdict = FileParseVerdict::partial("a.py", "python", &[5]);
        assert_eq!(verdict.error_message.unwrap(), "5");
    }
}
