//! Language alias expansion for the `language_filter` search parameter:
//! expands a given alias (e.g. `ts` -> `typescript`) to the canonical
//! `language_id`s it should match. A small fixed table, not
//! user-configurable, since the canonical `language_id`s are themselves
//! fixed by the built-in handler table.

/// Expand one caller-supplied language token into every canonical
/// `language_id` it should match. Unknown tokens pass through lowercased
/// unchanged, on the assumption the caller already used a canonical id.
pub fn expand_alias(token: &str) -> Vec<String> {
    let lower = token.to_lowercase();
    match lower.as_str() {
        "ts" => vec!["typescript".to_string()],
        "js" => vec!["javascript".to_string()],
        "py" => vec!["python".to_string()],
        "rb" => vec!["ruby".to_string()],
        "c++" | "cxx" => vec!["cpp".to_string()],
        "golang" => vec!["go".to_string()],
        "yml" => vec!["yaml".to_string()],
        other => vec![other.to_string()],
    }
}

/// Expand a whole caller-supplied language filter list into the flat set of
/// canonical ids the storage layer should match with `= ANY(...)`.
pub fn expand_all(tokens: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for token in tokens {
        for expanded in expand_alias(token) {
            if !out.contains(&expanded) {
                out.push(expanded);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ts_expands_to_typescript() {
        assert_eq!(expand_alias("ts"), vec!["typescript".to_string()]);
    }

    #[test]
    fn unknown_token_passes_through_lowercased() {
        assert_eq!(expand_alias("Rust"), vec!["rust".to_string()]);
    }

    #[test]
    fn expand_all_dedupes() {
        let expanded = expand_all(&["ts".to_string(), "typescript".to_string()]);
        assert_eq!(expanded, vec!["typescript".to_string()]);
    }
}
