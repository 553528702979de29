//! Index Module
//!
//! In-memory hash index from primary key to the offset of the key's newest
//! live record, and the replay that rebuilds it from a table log.
//!
//! ## Update Rule
//! Live writes and replay both go through [`HashIndex::apply`]:
//! - flag `"1"` points the key at the record's offset
//! - flag `"0"` removes the key, whether or not it was present
//! - any other flag leaves the index unchanged
//!
//! A tombstone beats every earlier insert for its key, and a later insert
//! resurrects the key. Because live operation and replay share the rule,
//! replaying a log from byte 0 rebuilds exactly the index the live engine
//! maintained.

mod hash_index;
mod replay;

pub use hash_index::HashIndex;
pub use replay::{replay, ReplayStats};
