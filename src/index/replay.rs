//! Index replay
//!
//! Rebuilds a table's index by scanning its log from byte 0.

use std::io::BufRead;

use crate::error::Result;
use crate::row::DELIMITER;

use super::HashIndex;

/// Summary of a replay pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayStats {
    /// Lines read, including skipped ones
    pub lines_scanned: u64,

    /// Lines with a key and flag that were fed to the index
    pub records_applied: u64,

    /// Lines with fewer than two fields
    pub lines_skipped: u64,

    /// Total bytes consumed
    pub bytes_scanned: u64,

    /// Whether the log ended in an unterminated line (a torn append)
    pub torn_tail: bool,
}

/// Replay a table log into a fresh index
///
/// Checksums are not verified here; they are checked when a row is read.
/// Lines with fewer than two fields are skipped without aborting the scan.
/// An unterminated final line is counted in `torn_tail` but never indexed.
pub fn replay<R: BufRead>(mut reader: R) -> Result<(HashIndex, ReplayStats)> {
    let mut index = HashIndex::new();
    let mut stats = ReplayStats::default();
    let mut offset: u64 = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }

        let line_start = offset;
        offset += n as u64;
        stats.lines_scanned += 1;

        if buf.last() != Some(&b'\n') {
            stats.torn_tail = true;
            break;
        }

        let line = String::from_utf8_lossy(&buf[..n - 1]);
        let mut parts = line.split(DELIMITER);
        match (parts.next(), parts.next()) {
            (Some(key), Some(flag)) => {
                index.apply(key, flag, line_start);
                stats.records_applied += 1;
            }
            _ => stats.lines_skipped += 1,
        }
    }

    stats.bytes_scanned = offset;
    Ok((index, stats))
}
