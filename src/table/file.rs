//! Table file manager
//!
//! Owns the tables directory and the physical I/O lock.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::config::SyncStrategy;
use crate::error::{LedgerError, Result};
use crate::row;

/// Manages the per-table log files
///
/// ## Concurrency:
/// - `io_lock`: appends and seals take it exclusively, reads take it shared
/// - The lock spans all tables, so appends to different tables serialize too
/// - All methods use `&self`
pub struct TableFiles {
    /// Directory holding one `.tbl` file per table
    dir: PathBuf,

    /// Durability policy for appends
    sync_strategy: SyncStrategy,

    /// Physical lock over file appends and reads
    io_lock: RwLock<()>,
}

impl TableFiles {
    const EXTENSION: &'static str = "tbl";

    /// Create a manager rooted at `dir` (created lazily on first write)
    pub fn new(dir: &Path, sync_strategy: SyncStrategy) -> Self {
        Self {
            dir: dir.to_path_buf(),
            sync_strategy,
            io_lock: RwLock::new(()),
        }
    }

    /// Create the table's file, failing if it already exists
    ///
    /// Returns `FileExists` when data is already on disk, which lets the
    /// caller switch to recovering that data instead of starting empty.
    pub fn create(&self, table: &str) -> Result<()> {
        let _guard = self.io_lock.write();

        fs::create_dir_all(&self.dir)?;
        let path = self.path(table);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(LedgerError::FileExists(path))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Append a row and return the offset where its line starts
    pub fn append<S: AsRef<str>>(&self, table: &str, fields: &[S]) -> Result<u64> {
        let line = row::encode(fields);

        let _guard = self.io_lock.write();

        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(table))?;

        // Current end-of-file is where this line lands
        let offset = file.metadata()?.len();

        file.write_all(line.as_bytes())?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            file.sync_data()?;
        }

        tracing::trace!(table, offset, bytes = line.len(), "appended row");
        Ok(offset)
    }

    /// Read and verify the row whose line starts at `offset`
    pub fn read(&self, table: &str, offset: u64) -> Result<Vec<String>> {
        let _guard = self.io_lock.read();

        let mut file = File::open(self.path(table))?;
        file.seek(SeekFrom::Start(offset))?;

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let n = reader.read_until(b'\n', &mut buf)?;

        if n == 0 {
            return Err(LedgerError::CorruptData(format!(
                "no record at offset {} in table {}",
                offset, table
            )));
        }
        if buf.last() != Some(&b'\n') {
            return Err(LedgerError::CorruptData(format!(
                "unterminated record at offset {} in table {}",
                offset, table
            )));
        }

        let line = String::from_utf8(buf).map_err(|_| {
            LedgerError::CorruptData(format!(
                "record at offset {} in table {} is not valid UTF-8",
                offset, table
            ))
        })?;

        row::decode(&line).map_err(|e| {
            if let LedgerError::Integrity { .. } = e {
                tracing::warn!(table, offset, "checksum mismatch: {}", e);
            }
            e
        })
    }

    /// Open the table's log for a sequential replay
    ///
    /// Returns `Ok(None)` when the file does not exist (an empty table).
    pub fn open_for_replay(&self, table: &str) -> Result<Option<BufReader<File>>> {
        match File::open(self.path(table)) {
            Ok(file) => Ok(Some(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Terminate a torn final line so the next append starts a fresh line
    ///
    /// Only ever appends a single `\n`; existing bytes are left untouched.
    /// Returns `true` if a terminator was written.
    pub fn seal(&self, table: &str) -> Result<bool> {
        let _guard = self.io_lock.write();

        let path = self.path(table);
        let mut file = match OpenOptions::new().read(true).append(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(false);
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1))?;
        file.read_exact(&mut last)?;
        if last[0] == b'\n' {
            return Ok(false);
        }

        file.write_all(b"\n")?;
        file.sync_data()?;
        Ok(true)
    }

    /// Force a table's file contents to disk
    pub fn sync(&self, table: &str) -> Result<()> {
        let _guard = self.io_lock.write();

        match File::open(self.path(table)) {
            Ok(file) => Ok(file.sync_all()?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Size of a table's log in bytes (0 if missing)
    pub fn file_len(&self, table: &str) -> Result<u64> {
        match fs::metadata(self.path(table)) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Path of a table's log file
    pub fn path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", table, Self::EXTENSION))
    }

    /// Directory holding the table files
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
