//! The splitting engine the index pipeline drives with a [`SeparatorSpec`]:
//! recursively cut text on the coarsest boundary pattern first, fall back
//! to finer patterns only where a piece still exceeds `chunk_size`, then
//! merge adjacent small pieces back up to `chunk_size` with `chunk_overlap`
//! bytes of trailing context carried into the next chunk.

use cocosearch_domain::ports::SeparatorSpec;
use regex::Regex;

/// One piece of text with its absolute byte offsets in the original input.
#[derive(Debug, Clone, Copy)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

/// Split `text` per `spec`'s ordered separators, honoring `chunk_size` and
/// `chunk_overlap` (both in bytes). Always returns at least one span
/// covering non-empty input.
pub fn split(text: &str, spec: &SeparatorSpec, chunk_size: usize, chunk_overlap: usize) -> Vec<ByteSpan> {
    if text.is_empty() {
        return Vec::new();
    }
    let patterns: Vec<Regex> = spec
        .patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect();

    let pieces = recursive_split(text, 0, &patterns, 0, chunk_size);
    merge_with_overlap(text, pieces, chunk_size, chunk_overlap)
}

/// Cut `text[offset_into_original..]`'s logical slice (already passed as
/// `text`) on `patterns[depth]`, recursing into oversized pieces with the
/// next finer pattern. `base_offset` is added to every produced span so
/// offsets stay absolute against the original file content.
fn recursive_split(
    text: &str,
    base_offset: usize,
    patterns: &[Regex],
    depth: usize,
    chunk_size: usize,
) -> Vec<ByteSpan> {
    if text.len() <= chunk_size || depth >= patterns.len() {
        return vec![ByteSpan { start: base_offset, end: base_offset + text.len() }];
    }

    let re = &patterns[depth];
    let mut spans = Vec::new();
    let mut last = 0usize;
    for m in re.find_iter(text) {
        if m.start() > last {
            spans.push((last, m.start()));
        }
        last = m.start();
    }
    spans.push((last, text.len()));
    spans.retain(|(s, e)| e > s);

    if spans.len() <= 1 {
        // The separator didn't actually split anything; try the next finer one.
        return recursive_split(text, base_offset, patterns, depth + 1, chunk_size);
    }

    let mut out = Vec::new();
    for (s, e) in spans {
        let slice = &text[s..e];
        if slice.len() > chunk_size {
            out.extend(recursive_split(slice, base_offset + s, patterns, depth + 1, chunk_size));
        } else {
            out.push(ByteSpan { start: base_offset + s, end: base_offset + e });
        }
    }
    out
}

/// Greedily pack adjacent spans into chunks up to `chunk_size`, then widen
/// each chunk's start backward by up to `chunk_overlap` bytes (clamped to
/// the previous chunk's start) so consecutive chunks share trailing
/// context.
fn merge_with_overlap(
    text: &str,
    pieces: Vec<ByteSpan>,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<ByteSpan> {
    if pieces.is_empty() {
        return Vec::new();
    }

    let mut merged: Vec<ByteSpan> = Vec::new();
    let mut cur_start = pieces[0].start;
    let mut cur_end = pieces[0].start;

    for piece in &pieces {
        if piece.end - cur_start > chunk_size && cur_end > cur_start {
            merged.push(ByteSpan { start: cur_start, end: cur_end });
            cur_start = piece.start;
        }
        cur_end = piece.end;
    }
    merged.push(ByteSpan { start: cur_start, end: cur_end });

    if chunk_overlap == 0 || merged.len() < 2 {
        return merged;
    }

    let mut out = Vec::with_capacity(merged.len());
    out.push(merged[0]);
    for i in 1..merged.len() {
        let prev_end = merged[i - 1].end;
        let widened_start = merged[i].start.saturating_sub(chunk_overlap).max(merged[i - 1].start);
        let widened_start = floor_char_boundary(text, widened_start.min(prev_end));
        out.push(ByteSpan { start: widened_start, end: merged[i].end });
    }
    out
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_spec() -> SeparatorSpec {
        SeparatorSpec {
            language: "python".into(),
            patterns: vec![r"\nclass ".into(), r"\ndef ".into(), r"\n\n".into()],
        }
    }

    #[test]
    fn short_text_is_one_chunk() {
        let text = "def f():\n    return 1\n";
        let spans = split(text, &python_spec(), 1000, 0);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[0].end, text.len());
    }

    #[test]
    fn splits_on_function_boundaries_when_oversized() {
        let text = format!("def a():\n{}\ndef b():\n{}\n", "x".repeat(50), "y".repeat(50));
        let boundary = text.find("\ndef b():").unwrap();
        let spans = split(&text, &python_spec(), 40, 0);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[0].end, boundary);
        assert_eq!(spans[1].start, boundary);
        assert_eq!(spans[1].end, text.len());
        assert!(text[spans[0].start..spans[0].end].starts_with("def a():"));
        assert!(text[spans[1].start..spans[1].end].trim_start().starts_with("def b():"));
    }

    #[test]
    fn overlap_widens_chunk_start() {
        let text = format!("def a():\n{}\ndef b():\n{}\n", "x".repeat(50), "y".repeat(50));
        let no_overlap = split(&text, &python_spec(), 40, 0);
        let with_overlap = split(&text, &python_spec(), 40, 10);
        assert!(with_overlap[1].start <= no_overlap[1].start);
    }

    #[test]
    fn empty_text_yields_no_spans() {
        assert!(split("", &python_spec(), 100, 0).is_empty());
    }
}
