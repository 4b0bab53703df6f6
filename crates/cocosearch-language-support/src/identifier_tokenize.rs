//! Identifier-aware tokenization for `content_tsv_input`: original text is
//! retained verbatim, then every identifier-shaped token has its
//! camel/snake/kebab components appended, so both `getUserById` and
//! `get user by id` queries match.

use std::sync::OnceLock;

fn identifier_pattern() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"[A-Za-z_][A-Za-z0-9_\-]{2,}").expect("valid regex"))
}

/// Split `identifier` into lowercase components on camelCase boundaries,
/// underscores, and hyphens.
fn split_identifier(identifier: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    let mut prev_upper = false;

    for ch in identifier.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            prev_upper = false;
            continue;
        }
        let is_upper = ch.is_uppercase();
        if is_upper && prev_lower {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(ch.to_ascii_lowercase());
        prev_lower = !is_upper && ch.is_alphanumeric();
        prev_upper = is_upper;
        let _ = prev_upper;
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts.retain(|p| p.len() > 1);
    parts
}

/// Build the `content_tsv_input` value for one chunk: original text plus
/// the appended split components of every identifier-shaped token found in
/// it. Splits that reproduce the original token (single-word identifiers)
/// are not duplicated.
pub fn tokenize_for_tsv(content_text: &str) -> String {
    let mut appended = String::new();
    for m in identifier_pattern().find_iter(content_text) {
        let token = m.as_str();
        let parts = split_identifier(token);
        if parts.len() > 1 {
            appended.push(' ');
            appended.push_str(&parts.join(" "));
        }
    }
    if appended.is_empty() {
        content_text.to_string()
    } else {
        format!("{content_text}{appended}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_case() {
        assert_eq!(split_identifier("getUserById"), vec!["get", "user", "by", "id"]);
    }

    #[test]
    fn splits_snake_case() {
        assert_eq!(split_identifier("get_user_by_email"), vec!["get", "user", "by", "email"]);
    }

    #[test]
    fn splits_kebab_case() {
        assert_eq!(split_identifier("my-component-name"), vec!["my", "component", "name"]);
    }

    #[test]
    fn single_word_identifier_not_duplicated() {
        let out = tokenize_for_tsv("return hello");
        assert_eq!(out, "return hello");
    }

    #[test]
    fn appends_split_components_after_original_text() {
        let out = tokenize_for_tsv("def getUserById(): pass");
        assert!(out.starts_with("def getUserById(): pass"));
        assert!(out.contains("get user by id"));
    }
}
