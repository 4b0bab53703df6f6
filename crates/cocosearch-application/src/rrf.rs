//! Reciprocal Rank Fusion over vector and keyword result lists: the fixed,
//! unweighted form `score = weight / (rank + k)` with `k` fixed at
//! [`cocosearch_domain::constants::RRF_K`] and `weight` always `1.0` for
//! each contributing source — no recency boost, no per-source weighting.

use cocosearch_domain::constants::RRF_K;
use cocosearch_domain::ports::storage::ScoredChunkRef;
use std::collections::HashMap;

/// A chunk identity used to merge the same chunk seen from both retrieval
/// sources into a single fused entry.
type ChunkKey = (String, usize, usize);

fn key_for(chunk: &ScoredChunkRef) -> ChunkKey {
    (chunk.filename.clone(), chunk.start_byte, chunk.end_byte)
}

/// One chunk's fused score plus the original row data, carried through so
/// downstream code never needs to re-look-up storage fields by key.
pub struct FusedChunk {
    pub chunk: ScoredChunkRef,
    pub score: f32,
}

/// Fuse a vector-search ranking and a keyword-search ranking into one
/// descending-score list. Either input may be empty (vector-only or
/// keyword-only retrieval); a chunk present in both lists has its two RRF
/// contributions summed.
pub fn fuse(vector_ranked: Vec<ScoredChunkRef>, keyword_ranked: Vec<ScoredChunkRef>) -> Vec<FusedChunk> {
    let mut scores: HashMap<ChunkKey, f32> = HashMap::new();
    let mut rows: HashMap<ChunkKey, ScoredChunkRef> = HashMap::new();

    for chunk in vector_ranked {
        let key = key_for(&chunk);
        let contribution = rrf_contribution(chunk.rank);
        *scores.entry(key.clone()).or_insert(0.0) += contribution;
        rows.entry(key).or_insert(chunk);
    }
    for chunk in keyword_ranked {
        let key = key_for(&chunk);
        let contribution = rrf_contribution(chunk.rank);
        *scores.entry(key.clone()).or_insert(0.0) += contribution;
        rows.entry(key).or_insert(chunk);
    }

    let mut fused: Vec<FusedChunk> = rows
        .into_iter()
        .map(|(key, chunk)| FusedChunk {
            score: scores[&key],
            chunk,
        })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk.filename.cmp(&b.chunk.filename))
            .then_with(|| a.chunk.start_byte.cmp(&b.chunk.start_byte))
    });
    fused
}

fn rrf_contribution(rank: usize) -> f32 {
    (1.0 / (rank as f64 + RRF_K)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(filename: &str, rank: usize) -> ScoredChunkRef {
        ScoredChunkRef {
            filename: filename.to_string(),
            start_byte: 0,
            end_byte: 10,
            language_id: None,
            block_type: None,
            hierarchy: None,
            symbol_type: None,
            symbol_name: None,
            symbol_signature: None,
            rank,
            raw_score: 0.0,
        }
    }

    #[test]
    fn chunk_in_both_lists_sums_contributions() {
        let vector = vec![row("a.rs", 0)];
        let keyword = vec![row("a.rs", 0)];
        let fused = fuse(vector, keyword);
        assert_eq!(fused.len(), 1);
        let expected = 2.0 * rrf_contribution(0);
        assert!((fused[0].score - expected).abs() < 1e-6);
    }

    #[test]
    fn higher_rank_in_either_source_sorts_first() {
        let vector = vec![row("a.rs", 0), row("b.rs", 1)];
        let keyword = vec![];
        let fused = fuse(vector, keyword);
        assert_eq!(fused[0].chunk.filename, "a.rs");
        assert_eq!(fused[1].chunk.filename, "b.rs");
    }

    #[test]
    fn tie_breaks_by_filename_then_start_byte() {
        let vector = vec![row("b.rs", 0), row("a.rs", 0)];
        let fused = fuse(vector, vec![]);
        assert_eq!(fused[0].chunk.filename, "a.rs");
        assert_eq!(fused[1].chunk.filename, "b.rs");
    }

    #[test]
    fn vector_only_retrieval_works() {
        let fused = fuse(vec![row("a.rs", 0)], vec![]);
        assert_eq!(fused.len(), 1);
    }
}
