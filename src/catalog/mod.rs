//! Catalog Module
//!
//! Table registry: persisted table metadata and the schemas derived from it.
//!
//! ## Row Positions
//! ```text
//! declared:  [ id int ][ merchant text ][ amount int ]
//!                 │            │               │
//! row:       [ key ][ flag ][ merchant ][ amount ][ checksum ]
//!               0      1         2          3
//! ```
//! The first declared column names the key slot; every later column is
//! shifted one position right to skip the active flag.

mod schema;
mod store;

pub use schema::{fold_case, validate_table_name, ColumnDef, Schema, TableMetadata};
pub use store::MetadataStore;
