//! Query Analyzer: classifies a query string so the search engine can pick
//! a `use_hybrid` default when the caller didn't pass an explicit flag.
//! Identifier detection uses mixed-case / snake_case / long-alnum
//! heuristics to classify a whole query.

use std::sync::OnceLock;

/// How a query classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryClass {
    /// Looks like natural language: no identifier-shaped tokens.
    Conceptual,
    /// Every significant token is identifier-shaped.
    IdentifierHeavy,
    /// A mix of natural-language words and identifier-shaped tokens.
    Mixed,
}

impl QueryClass {
    /// Default `use_hybrid` for this class, absent an explicit caller flag.
    pub fn default_use_hybrid(self) -> bool {
        match self {
            QueryClass::Conceptual => false,
            QueryClass::IdentifierHeavy | QueryClass::Mixed => true,
        }
    }
}

fn identifier_token_pattern() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("valid regex"))
}

/// An individual whitespace-separated token is "identifier-shaped" when it
/// contains an underscore, mixed case (camelCase/PascalCase), or is a long
/// (>= 12 char) unbroken alphanumeric run without spaces.
fn is_identifier_shaped(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    if token.contains('_') {
        return true;
    }
    if !identifier_token_pattern().is_match(token) {
        return false;
    }
    let has_upper = token.chars().any(|c| c.is_uppercase());
    let has_lower = token.chars().any(|c| c.is_lowercase());
    if has_upper && has_lower {
        return true;
    }
    token.chars().count() >= 12
}

/// Classify `query_text` by how many of its tokens look identifier-shaped.
pub fn classify(query_text: &str) -> QueryClass {
    let tokens: Vec<&str> = query_text.split_whitespace().collect();
    if tokens.is_empty() {
        return QueryClass::Conceptual;
    }

    let identifier_count = tokens.iter().filter(|t| is_identifier_shaped(t)).count();

    if identifier_count == 0 {
        QueryClass::Conceptual
    } else if identifier_count == tokens.len() {
        QueryClass::IdentifierHeavy
    } else {
        QueryClass::Mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_camel_case_token_is_identifier_heavy() {
        assert_eq!(classify("getUserById"), QueryClass::IdentifierHeavy);
    }

    #[test]
    fn natural_language_query_is_conceptual() {
        assert_eq!(classify("how does authentication work"), QueryClass::Conceptual);
    }

    #[test]
    fn mixed_query_has_both() {
        assert_eq!(classify("where is getUserById called"), QueryClass::Mixed);
    }

    #[test]
    fn snake_case_token_counts_as_identifier() {
        assert_eq!(classify("get_user_by_email"), QueryClass::IdentifierHeavy);
    }

    #[test]
    fn long_alnum_run_counts_as_identifier() {
        assert_eq!(classify("abcdefghijklmno"), QueryClass::IdentifierHeavy);
    }

    #[test]
    fn conceptual_default_is_vector_only() {
        assert!(!QueryClass::Conceptual.default_use_hybrid());
    }

    #[test]
    fn identifier_heavy_default_is_hybrid() {
        assert!(QueryClass::IdentifierHeavy.default_use_hybrid());
    }
}
