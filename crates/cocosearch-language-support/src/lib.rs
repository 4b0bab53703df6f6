//! # Language Support
//!
//! C1 (Handler Registry), C2 (Symbol Extractor), and C3 (Parse Tracker):
//! everything that needs a concrete grammar or a concrete regex table sits
//! here, behind the `cocosearch-domain` port traits it implements. Every
//! symbol shipped by this crate is feature-gated behind `treesitter`
//! (default-on), matching the dependency set it pulls in.
//!
//! | Module | Port implemented | Notes |
//! |--------|------------------|-------|
//! | [`registry`] | `HandlerRegistry` | compile-time handler table, extension-conflict checked at construction |
//! | [`languages`] | — | built-in language handlers |
//! | [`grammars`] | — | built-in grammar handlers (path + content marker) |
//! | [`symbol_extractor`] | `SymbolExtractor` | tree-sitter, per chunk |
//! | [`parse_tracker`] | `ParseVerdictClassifier` | tree-sitter, per file |
//! | [`chunking`] | — | the splitter C4 drives with a handler's `SeparatorSpec` |
//! | [`identifier_tokenize`] | — | `content_tsv_input` derivation |
//! | [`treesitter`] | — | shared parser pool, reused by C8's smart-context node lookup |

pub mod chunking;
pub mod grammars;
pub mod identifier_tokenize;
pub mod languages;
pub mod parse_tracker;
pub mod registry;
pub mod symbol_extractor;
pub mod treesitter;

pub use parse_tracker::TreeSitterParseTracker;
pub use registry::StaticHandlerRegistry;
pub use symbol_extractor::TreeSitterSymbolExtractor;
pub use treesitter::ParserPool;
