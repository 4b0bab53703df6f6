//! Glob-to-`LIKE` translation for the `symbol_name` search filter: a plain
//! glob (`*`/`?`) translates to SQL `LIKE` with `%`/`_` escaped
//! appropriately; a glob containing a character class (`[...]`) translates
//! to a regex match instead, since `LIKE` has no class syntax.

/// A translated symbol-name filter, ready for the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolNamePattern {
    /// Safe to push straight into `symbol_name LIKE $1`.
    Like(String),
    /// The glob used a bracket class (`[...]`); storage must match this with
    /// a `~` regex instead, since `LIKE` has no class syntax.
    Regex(String),
}

/// Translate a caller-supplied glob (`*` = any run, `?` = one char, `[...]`
/// = character class) into a pattern the storage layer can match against
/// `symbol_name`.
pub fn translate(glob: &str) -> SymbolNamePattern {
    if glob.contains('[') {
        return SymbolNamePattern::Regex(glob_to_regex(glob));
    }

    let mut like = String::with_capacity(glob.len());
    for ch in glob.chars() {
        match ch {
            '*' => like.push('%'),
            '?' => like.push('_'),
            '%' | '_' | '\\' => {
                like.push('\\');
                like.push(ch);
            }
            other => like.push(other),
        }
    }
    SymbolNamePattern::Like(like)
}

/// Convert a glob containing a bracket class into an anchored POSIX regex
/// suitable for Postgres `~`.
fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::from("^");
    let mut chars = glob.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '[' => {
                regex.push('[');
                while let Some(&next) = chars.peek() {
                    chars.next();
                    regex.push(next);
                    if next == ']' {
                        break;
                    }
                }
            }
            '.' | '^' | '$' | '+' | '(' | ')' | '{' | '}' | '|' | '\\' => {
                regex.push('\\');
                regex.push(ch);
            }
            other => regex.push(other),
        }
    }
    regex.push('$');
    regex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_becomes_percent() {
        assert_eq!(translate("*Handler"), SymbolNamePattern::Like("%Handler".to_string()));
    }

    #[test]
    fn question_mark_becomes_underscore() {
        assert_eq!(translate("get?oo"), SymbolNamePattern::Like("get_oo".to_string()));
    }

    #[test]
    fn literal_percent_is_escaped() {
        assert_eq!(translate("100%done"), SymbolNamePattern::Like("100\\%done".to_string()));
    }

    #[test]
    fn bracket_class_routes_to_regex() {
        match translate("[A-Z]*Handler") {
            SymbolNamePattern::Regex(pattern) => assert_eq!(pattern, "^[A-Z].*Handler$"),
            SymbolNamePattern::Like(_) => panic!("expected regex variant"),
        }
    }
}
