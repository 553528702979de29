//! Hash index implementation

use std::collections::HashMap;

use crate::row::{FLAG_ACTIVE, FLAG_TOMBSTONE};

/// Primary key → byte offset of the key's newest live record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashIndex {
    entries: HashMap<String, u64>,
}

impl HashIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one log record to the index
    pub fn apply(&mut self, key: &str, flag: &str, offset: u64) {
        match flag {
            FLAG_ACTIVE => {
                self.entries.insert(key.to_string(), offset);
            }
            FLAG_TOMBSTONE => {
                self.entries.remove(key);
            }
            _ => {}
        }
    }

    /// Point `key` at `offset`
    pub fn insert(&mut self, key: &str, offset: u64) {
        self.entries.insert(key.to_string(), offset);
    }

    /// Remove `key`, returning its last offset if it was live
    pub fn remove(&mut self, key: &str) -> Option<u64> {
        self.entries.remove(key)
    }

    /// Offset of the live record for `key`
    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All (key, offset) pairs sorted by offset, i.e. log order
    pub fn by_offset(&self) -> Vec<(String, u64)> {
        let mut pairs: Vec<(String, u64)> = self
            .entries
            .iter()
            .map(|(k, &off)| (k.clone(), off))
            .collect();
        pairs.sort_by_key(|&(_, off)| off);
        pairs
    }
}
