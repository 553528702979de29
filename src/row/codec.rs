//! Row codec
//!
//! Encoding and decoding of rows with a trailing SHA-256 checksum.

use sha2::{Digest, Sha256};

use crate::error::{LedgerError, Result};

/// Field separator within a line
pub const DELIMITER: char = '|';

/// Record terminator
pub const TERMINATOR: char = '\n';

/// Length of the hex-encoded checksum field
pub const CHECKSUM_LEN: usize = 64;

/// Compute the hex SHA-256 of the pipe-joined fields
pub fn checksum<S: AsRef<str>>(fields: &[S]) -> String {
    let mut hasher = Sha256::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            hasher.update([DELIMITER as u8]);
        }
        hasher.update(field.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Reject fields that would break the one-record-per-line layout
///
/// Only the terminator is checked. A `|` inside a field is accepted and
/// splits into extra fields on read.
pub fn check_fields<S: AsRef<str>>(fields: &[S]) -> Result<()> {
    match fields.iter().position(|f| f.as_ref().contains(TERMINATOR)) {
        Some(i) => Err(LedgerError::Validation(format!(
            "field {} contains a line break",
            i
        ))),
        None => Ok(()),
    }
}

/// Encode a row as one terminated log line
///
/// Format: field0|field1|...|fieldN|checksum\n
pub fn encode<S: AsRef<str>>(fields: &[S]) -> String {
    let sum = checksum(fields);
    let data_len: usize = fields.iter().map(|f| f.as_ref().len() + 1).sum();

    let mut line = String::with_capacity(data_len + CHECKSUM_LEN + 1);
    for field in fields {
        line.push_str(field.as_ref());
        line.push(DELIMITER);
    }
    line.push_str(&sum);
    line.push(TERMINATOR);
    line
}

/// Decode a log line into its data fields, verifying the checksum
///
/// The trailing terminator is optional. Fails with `CorruptData` when the
/// line has fewer than two fields and with `Integrity` when the stored
/// checksum does not match the data.
pub fn decode(line: &str) -> Result<Vec<String>> {
    let line = line.strip_suffix(TERMINATOR).unwrap_or(line);

    let mut parts: Vec<&str> = line.split(DELIMITER).collect();
    if parts.len() < 2 {
        return Err(LedgerError::CorruptData(format!(
            "row has {} field(s), expected at least 2",
            parts.len()
        )));
    }

    // Last field is the stored checksum, the rest is data
    let stored = parts.pop().unwrap_or_default();
    let computed = checksum(&parts);
    if stored != computed {
        return Err(LedgerError::Integrity {
            stored: stored.to_string(),
            computed,
        });
    }

    Ok(parts.into_iter().map(str::to_string).collect())
}
