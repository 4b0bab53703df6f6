//! C5 — Schema & Storage, Postgres-backed.

mod postgres;
mod table_names;

pub use postgres::PostgresStorage;
pub use table_names::{chunks_table, parse_results_table};
