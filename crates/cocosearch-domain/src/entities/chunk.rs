//! The `Chunk` entity: a contiguous, semantically meaningful slice of a
//! source file, addressable by `(filename, start_byte, end_byte)`.

use crate::error::{CocoError, Result};

/// The symbol triple attached to a chunk when C2 (symbol extraction)
/// recognized a primary definition inside it. All three fields travel
/// together — a chunk either has a full symbol or none at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    /// One of `function`, `method`, `class`, `interface`.
    pub symbol_type: String,
    /// For methods, fully qualified as `ClassName.method`.
    pub symbol_name: String,
    /// Source-faithful signature, including decorators/async markers/return
    /// annotations and trailing punctuation.
    pub symbol_signature: String,
}

/// A finite piece of source text, the unit of embedding and retrieval.
///
/// Identity is `(filename, start_byte, end_byte)` within one index; see
/// spec §3. Construction is only possible through [`Chunk::new`], which
/// enforces the entity's invariants so no other component can construct an
/// invalid chunk.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub filename: String,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Exact chunk bytes, as text.
    pub content_text: String,
    /// Identifier-aware tokenized text fed to the lexical indexer: original
    /// identifiers plus their camel/snake/kebab splits appended.
    pub content_tsv_input: String,
    /// Dense embedding vector. Dimension is fixed by the embedding source
    /// for the lifetime of an index.
    pub embedding: Vec<f32>,
    /// Lowercase canonical language id, e.g. `python`, `hcl`.
    pub language_id: Option<String>,
    /// Handler-defined block kind, e.g. `function`, `resource`.
    pub block_type: Option<String>,
    /// Handler-defined dotted/colon-separated path.
    pub hierarchy: Option<String>,
    /// Primary symbol definition detected in this chunk, if any.
    pub symbol: Option<SymbolInfo>,
}

impl Chunk {
    /// Construct a chunk, enforcing:
    /// - `start_byte <= end_byte <= file_size_at_index_time`
    /// - `embedding` non-empty
    /// - `content_text` non-empty
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        filename: impl Into<String>,
        start_byte: usize,
        end_byte: usize,
        file_size_at_index_time: usize,
        content_text: impl Into<String>,
        content_tsv_input: impl Into<String>,
        embedding: Vec<f32>,
        language_id: Option<String>,
        block_type: Option<String>,
        hierarchy: Option<String>,
        symbol: Option<SymbolInfo>,
    ) -> Result<Self> {
        let filename = filename.into();
        let content_text = content_text.into();

        if start_byte > end_byte {
            return Err(CocoError::validation(format!(
                "chunk for {filename}: start_byte {start_byte} > end_byte {end_byte}"
            )));
        }
        if end_byte > file_size_at_index_time {
            return Err(CocoError::validation(format!(
                "chunk for {filename}: end_byte {end_byte} exceeds file size {file_size_at_index_time}"
            )));
        }
        if content_text.is_empty() {
            return Err(CocoError::validation(format!(
                "chunk for {filename} at [{start_byte}, {end_byte}): content_text is empty"
            )));
        }
        if embedding.is_empty() {
            return Err(CocoError::validation(format!(
                "chunk for {filename} at [{start_byte}, {end_byte}): embedding is empty"
            )));
        }

        Ok(Self {
            filename,
            start_byte,
            end_byte,
            content_text,
            content_tsv_input: content_tsv_input.into(),
            embedding,
            language_id,
            block_type,
            hierarchy,
            symbol,
        })
    }

    /// Identity tuple used for upsert/delete keys and cross-run diffing.
    pub fn identity(&self) -> (&str, usize, usize) {
        (&self.filename, self.start_byte, self.end_byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding() -> Vec<f32> {
        vec![0.1, 0.2, 0.3]
    }

    #[test]
    fn rejects_start_after_end() {
        let err = Chunk::new(
            "a.py", 10, 5, 100, "def f(): pass", "def f pass", embedding(), None, None, None, None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("start_byte"));
    }

    #[test]
    fn rejects_end_beyond_file_size() {
        let err = Chunk::new(
            "a.py", 0, 200, 100, "def f(): pass", "def f pass", embedding(), None, None, None, None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("file size"));
    }

    #[test]
    fn rejects_empty_content() {
        let err =
            Chunk::new("a.py", 0, 0, 100, "", "", embedding(), None, None, None, None).unwrap_err();
        assert!(err.to_string().contains("content_text"));
    }

    #[test]
    fn rejects_empty_embedding() {
        let err = Chunk::new(
            "a.py", 0, 13, 100, "def f(): pass", "def f pass", vec![], None, None, None, None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("embedding"));
    }

    #[test]
    fn accepts_valid_chunk() {
        let chunk = Chunk::new(
            "a.py", 0, 13, 100, "def f(): pass", "def f pass", embedding(), Some("python".into()),
            Some("function".into()), Some("f".into()), None,
        )
        .unwrap();
        assert_eq!(chunk.identity(), ("a.py", 0, 13));
    }
}
