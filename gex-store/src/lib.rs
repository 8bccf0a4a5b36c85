//! Storage primitives for the gex engine
//!
//! Three concerns live here: the read-only SQLite catalog behind a shared
//! connection pool, the SQL template helpers that all permission filtering
//! must flow through, and random-access reads of the packed binary
//! expression files.

pub mod block;
pub mod sql;
pub mod store;

pub use block::read_block;
pub use sql::{
    in_clause, permission_clause, SqlArgs, DATASETS_MARKER, PERMISSIONS_MARKER, PROBES_MARKER,
};
pub use store::{query_row_opt, query_rows, CatalogStore, CATALOG_FILE};
