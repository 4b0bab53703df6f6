//! Human-readable and `--json` rendering for `search`/`stats`/`list`
//! output. Kept separate from `main.rs` so the dispatch logic there reads
//! as argument handling, not formatting.

use cocosearch_domain::ports::IndexStats;
use cocosearch_domain::value_objects::SearchResult;
use serde_json::json;

pub fn print_search_results(results: &[SearchResult], json: bool) {
    if json {
        let items: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                json!({
                    "filename": r.filename,
                    "start_byte": r.start_byte,
                    "end_byte": r.end_byte,
                    "score": r.score,
                    "language_id": r.language_id,
                    "block_type": r.block_type,
                    "hierarchy": r.hierarchy,
                    "symbol_type": r.symbol_type,
                    "symbol_name": r.symbol_name,
                    "symbol_signature": r.symbol_signature,
                    "context_before": r.context_before,
                    "context_after": r.context_after,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items).unwrap_or_default());
        return;
    }

    if results.is_empty() {
        eprintln!("No results.");
        return;
    }

    for r in results {
        println!("{:<50} [{}, {})  score={:.3}", r.filename, r.start_byte, r.end_byte, r.score);
        if let Some(symbol) = &r.symbol_name {
            let kind = r.symbol_type.as_deref().unwrap_or("symbol");
            println!("  {kind} {symbol}");
        }
        if let Some(before) = &r.context_before {
            for line in before {
                println!("  {line}");
            }
        }
        if let Some(after) = &r.context_after {
            for line in after {
                println!("  {line}");
            }
        }
        println!();
    }
    eprintln!("{} results", results.len());
}

pub fn print_index_stats(name: &str, stats: &IndexStats, show_failures: bool, json: bool) {
    if json {
        let value = json!({
            "index": name,
            "chunk_count": stats.chunk_count,
            "file_count": stats.file_count,
            "storage_bytes": stats.storage_bytes,
            "languages": stats.languages.iter().map(|l| json!({
                "language_id": l.language_id,
                "chunk_count": l.chunk_count,
            })).collect::<Vec<_>>(),
            "parse_statuses": stats.parse_statuses.iter().map(|p| json!({
                "parse_status": p.parse_status,
                "file_count": p.file_count,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return;
    }

    println!("{name}: {} chunks across {} files ({} bytes)", stats.chunk_count, stats.file_count, stats.storage_bytes);
    for lang in &stats.languages {
        println!("  {:<15} {}", lang.language_id, lang.chunk_count);
    }
    for status in &stats.parse_statuses {
        if !show_failures && status.parse_status != "ok" {
            continue;
        }
        println!("  parse:{:<10} {}", status.parse_status, status.file_count);
    }
}
