//! Metadata store
//!
//! Persists every table's metadata as one JSON document.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::TableMetadata;

/// JSON file mapping table name → metadata
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    const FILENAME: &'static str = "metadata.json";

    /// Store rooted in `data_dir`
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(Self::FILENAME),
        }
    }

    /// Load all table metadata; a missing file means no tables yet
    pub fn load(&self) -> Result<BTreeMap<String, TableMetadata>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        let tables = serde_json::from_reader(BufReader::new(file))?;
        Ok(tables)
    }

    /// Replace the persisted metadata with `tables`
    ///
    /// Writes a sibling temp file, syncs it, then renames it over the old
    /// document so readers never see a half-written file.
    pub fn save(&self, tables: &BTreeMap<String, TableMetadata>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, tables)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
