//! Row Module
//!
//! Text encoding of a single table row, one row per log line.
//!
//! ## Line Format
//! ```text
//! ┌───────┬──────┬────────┬─────┬────────┬──────────────────┬────┐
//! │  key  │ flag │  col2  │ ... │  colN  │ sha256 (64 hex)  │ \n │
//! └───────┴──────┴────────┴─────┴────────┴──────────────────┴────┘
//!    fields joined by '|'; checksum covers the joined fields before it
//! ```
//!
//! Fields must not contain `|` or `\n`. Nothing escapes them: writes with a
//! line break are rejected by `check_fields`, while a field carrying the
//! delimiter splits into extra fields on read.

mod codec;

pub use codec::{check_fields, checksum, decode, encode, CHECKSUM_LEN, DELIMITER, TERMINATOR};

/// Active flag value for a live record
pub const FLAG_ACTIVE: &str = "1";

/// Active flag value for a tombstone
pub const FLAG_TOMBSTONE: &str = "0";
