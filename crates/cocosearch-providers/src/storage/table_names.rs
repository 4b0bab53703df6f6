//! Table name derivation for one index. Both names are built from a
//! validated [`IndexName`] only — nothing caller-supplied reaches a DDL
//! string unchecked.

use cocosearch_domain::entities::IndexName;

/// Chunk table name. Spec §4.5: "legacy convention, preserved" — the name
/// segment appears twice.
pub fn chunks_table(index: &IndexName) -> String {
    format!("codeindex_{name}__{name}_chunks", name = index.as_str())
}

/// Parse-health results table name for one index.
pub fn parse_results_table(index: &IndexName) -> String {
    format!("cocosearch_parse_results_{}", index.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_table_repeats_the_index_name() {
        let index = IndexName::parse("myrepo").unwrap();
        assert_eq!(chunks_table(&index), "codeindex_myrepo__myrepo_chunks");
    }

    #[test]
    fn parse_results_table_is_prefixed() {
        let index = IndexName::parse("myrepo").unwrap();
        assert_eq!(parse_results_table(&index), "cocosearch_parse_results_myrepo");
    }
}
