//! Core business entities with identity: [`Chunk`] and [`FileParseVerdict`],
//! plus [`IndexName`], the validated identifier shared by every table name
//! the storage layer derives.

mod chunk;
mod index_name;
mod parse_verdict;

pub use chunk::{Chunk, SymbolInfo};
pub use index_name::IndexName;
pub use parse_verdict::{FileParseVerdict, ParseStatus};
