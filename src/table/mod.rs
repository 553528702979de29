//! Table File Module
//!
//! One append-only log per table, addressed by byte offset.
//!
//! ## Responsibilities
//! - Append encoded rows at end-of-file and report their offset
//! - Read and verify the single row starting at an offset
//! - Exclusive creation so callers can detect pre-existing data
//! - Seal torn tails left behind by a crash mid-append
//!
//! ## Layout
//! ```text
//! {data_dir}/tables/
//!   ├── tx.tbl
//!   └── accounts.tbl
//! ```
//!
//! All file I/O goes through one physical lock shared by every table:
//! appends take it exclusively, reads take it shared.

mod file;

pub use file::TableFiles;
