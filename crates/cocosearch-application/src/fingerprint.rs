//! Exact-cache key: SHA-256 of a canonical serialization of `(text,
//! index_name, limit, min_score, use_hybrid, language_filter normalized,
//! sorted(symbol_type), symbol_name)`. Context fields
//! (`smart_context`/`context_before`/`context_after`/`no_cache`) are
//! deliberately excluded, since they only affect post-fusion expansion,
//! not which rows get retrieved and scored.

use cocosearch_domain::value_objects::Query;
use sha2::{Digest, Sha256};

/// Compute the exact-match fingerprint for `query` against `resolved_hybrid`
/// — the caller passes in whatever the query analyzer resolved `use_hybrid`
/// to, since the fingerprint must reflect the effective flag, not the
/// caller's `None`.
pub fn exact_fingerprint(query: &Query, resolved_hybrid: bool) -> String {
    let mut canonical = String::new();
    canonical.push_str(query.text.trim());
    canonical.push('\u{1}');
    canonical.push_str(&filter_key(query, resolved_hybrid));
    hex_encode(&Sha256::digest(canonical.as_bytes()))
}

/// Hash every cache-key component except the raw query text — the scope a
/// semantic lookup uses to find candidate neighbors (same index, same
/// filters, different wording).
pub fn filter_key(query: &Query, resolved_hybrid: bool) -> String {
    let mut canonical = String::new();
    canonical.push_str(query.index_name.as_str());
    canonical.push('\u{1}');
    canonical.push_str(&query.limit.to_string());
    canonical.push('\u{1}');
    canonical.push_str(&format!("{:.6}", query.min_score));
    canonical.push('\u{1}');
    canonical.push_str(if resolved_hybrid { "1" } else { "0" });
    canonical.push('\u{1}');
    canonical.push_str(&normalized_language_filter(query.language_filter.as_deref()));
    canonical.push('\u{1}');
    canonical.push_str(&sorted_symbol_types(&query.symbol_type));
    canonical.push('\u{1}');
    canonical.push_str(query.symbol_name.as_deref().unwrap_or(""));

    hex_encode(&Sha256::digest(canonical.as_bytes()))
}

fn normalized_language_filter(language_filter: Option<&[String]>) -> String {
    match language_filter {
        Some(langs) => {
            let mut normalized: Vec<String> = langs.iter().map(|l| l.to_lowercase()).collect();
            normalized.sort();
            normalized.dedup();
            normalized.join(",")
        }
        None => String::new(),
    }
}

fn sorted_symbol_types(symbol_type: &Option<std::collections::BTreeSet<String>>) -> String {
    match symbol_type {
        Some(set) => set.iter().cloned().collect::<Vec<_>>().join(","),
        None => String::new(),
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocosearch_domain::entities::IndexName;

    fn base_query(text: &str) -> Query {
        Query::new(text, IndexName::parse("myindex").unwrap(), 10).unwrap()
    }

    #[test]
    fn identical_queries_fingerprint_identically() {
        let a = base_query("hello world");
        let b = base_query("hello world");
        assert_eq!(exact_fingerprint(&a, true), exact_fingerprint(&b, true));
    }

    #[test]
    fn different_hybrid_resolution_changes_fingerprint() {
        let query = base_query("hello world");
        assert_ne!(exact_fingerprint(&query, true), exact_fingerprint(&query, false));
    }

    #[test]
    fn language_filter_order_does_not_matter() {
        let mut a = base_query("hello");
        a = a.with_language_filter(vec!["ts".to_string(), "py".to_string()]);
        let mut b = base_query("hello");
        b = b.with_language_filter(vec!["py".to_string(), "ts".to_string()]);
        assert_eq!(exact_fingerprint(&a, true), exact_fingerprint(&b, true));
    }

    #[test]
    fn symbol_type_set_order_does_not_matter() {
        let mut a = base_query("hello");
        a = a.with_symbol_type(vec!["class".to_string(), "function".to_string()]);
        let mut b = base_query("hello");
        b = b.with_symbol_type(vec!["function".to_string(), "class".to_string()]);
        assert_eq!(exact_fingerprint(&a, true), exact_fingerprint(&b, true));
    }
}
