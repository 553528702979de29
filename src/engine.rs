//! Engine Module
//!
//! The storage engine that coordinates the catalog, the hash indexes, and
//! the table files.
//!
//! ## Responsibilities
//! - Rebuild every table's index from its log on startup
//! - Route CRUD operations to the right table log and index
//! - Keep index updates in the same order as log appends
//! - Persist table metadata when tables are created

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockWriteGuard};

use crate::catalog::{fold_case, validate_table_name, MetadataStore, Schema, TableMetadata};
use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::index::{replay, HashIndex, ReplayStats};
use crate::protocol::{Command, Reply};
use crate::row::{self, FLAG_ACTIVE, FLAG_TOMBSTONE, TERMINATOR};
use crate::table::TableFiles;

/// In-memory state guarded by the logical lock
#[derive(Default)]
struct Catalog {
    schemas: HashMap<String, Schema>,
    indexes: HashMap<String, HashIndex>,
    writers: HashMap<String, Arc<Mutex<()>>>,
}

impl Catalog {
    fn schema(&self, table: &str) -> Result<&Schema> {
        self.schemas
            .get(table)
            .ok_or_else(|| LedgerError::TableNotFound(table.to_string()))
    }

    fn index(&self, table: &str) -> Result<&HashIndex> {
        self.indexes
            .get(table)
            .ok_or_else(|| LedgerError::TableNotFound(table.to_string()))
    }

    fn index_mut(&mut self, table: &str) -> Result<&mut HashIndex> {
        self.indexes
            .get_mut(table)
            .ok_or_else(|| LedgerError::TableNotFound(table.to_string()))
    }

    fn writer(&self, table: &str) -> Result<Arc<Mutex<()>>> {
        self.writers
            .get(table)
            .map(Arc::clone)
            .ok_or_else(|| LedgerError::TableNotFound(table.to_string()))
    }

    fn register(&mut self, schema: Schema, index: HashIndex) {
        let name = schema.name().to_string();
        self.writers.insert(name.clone(), Arc::new(Mutex::new(())));
        self.indexes.insert(name.clone(), index);
        self.schemas.insert(name, schema);
    }

    fn offset_of(&self, table: &str, key: &str) -> Result<u64> {
        self.index(table)?
            .get(key)
            .ok_or_else(|| LedgerError::KeyNotFound {
                table: table.to_string(),
                key: key.to_string(),
            })
    }

    fn metadata_snapshot(&self) -> BTreeMap<String, TableMetadata> {
        self.schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.metadata().clone()))
            .collect()
    }
}

/// The main storage engine
///
/// ## Concurrency Model
///
/// - **Table writer** (one `Mutex` per table): held by insert, update and
///   delete across read → append → index update, so a table's index always
///   reflects its log order
///
/// - **Logical lock** (`catalog`): guards the schema and index maps
///   - lookups and scans hold it shared, and only long enough to copy offsets
///   - mutations hold it exclusively only to apply their index change, never
///     across file I/O
///
/// - **Physical lock** (inside `TableFiles`): guards file appends and reads
///   - shared across all tables
///
/// Acquisition order is always table writer, then logical, then physical.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Schemas and indexes (logical lock)
    catalog: RwLock<Catalog>,

    /// Per-table log files (physical lock)
    files: TableFiles,

    /// Persisted table metadata
    metadata: MetadataStore,

    /// Tables whose replay failed during `open`
    recovery_failures: Vec<String>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const TABLES_DIR: &'static str = "tables";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Load table metadata
    /// 3. Replay each table's log into a fresh index
    /// 4. Ready to serve requests
    ///
    /// A table whose log cannot be replayed keeps an empty index and is
    /// listed in `recovery_failures()`; the other tables still open. Such a
    /// table still answers reads but refuses writes, since rows appended on
    /// top of an unreadable log would not match what the next open rebuilds.
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let files = TableFiles::new(
            &config.data_dir.join(Self::TABLES_DIR),
            config.sync_strategy,
        );
        let metadata = MetadataStore::new(&config.data_dir);

        let mut catalog = Catalog::default();
        let mut recovery_failures = Vec::new();

        for (name, table_meta) in metadata.load()? {
            let index = match Self::replay_table(&files, &name) {
                Ok((index, stats)) => {
                    tracing::info!(
                        table = %name,
                        live_keys = index.len(),
                        records = stats.records_applied,
                        skipped = stats.lines_skipped,
                        bytes = stats.bytes_scanned,
                        "Replayed table log"
                    );
                    index
                }
                Err(e) => {
                    tracing::error!(table = %name, "Failed to recover table index: {}", e);
                    recovery_failures.push(name.clone());
                    HashIndex::new()
                }
            };

            catalog.register(Schema::new(table_meta), index);
        }

        tracing::info!(
            tables = catalog.schemas.len(),
            failed = recovery_failures.len(),
            data_dir = %config.data_dir.display(),
            "Engine opened"
        );

        Ok(Self {
            config,
            catalog: RwLock::new(catalog),
            files,
            metadata,
            recovery_failures,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Replay one table's log, sealing a torn tail if one is found
    fn replay_table(files: &TableFiles, table: &str) -> Result<(HashIndex, ReplayStats)> {
        let (index, stats) = match files.open_for_replay(table)? {
            Some(reader) => replay(reader)?,
            None => (HashIndex::new(), ReplayStats::default()),
        };

        if stats.torn_tail {
            tracing::warn!(table, "Log ends in a torn record, sealing it");
            files.seal(table)?;
        }

        Ok((index, stats))
    }

    /// Writer lock for a table that accepts mutations
    fn writer(&self, table: &str) -> Result<Arc<Mutex<()>>> {
        let writer = self.catalog.read().writer(table)?;
        if self.recovery_failures.iter().any(|failed| failed == table) {
            return Err(LedgerError::CorruptData(format!(
                "table {} failed recovery, writes are disabled until its log is repaired",
                table
            )));
        }
        Ok(writer)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::CreateTable { name, columns } => {
                self.create_table(&name, &columns)?;
                Ok(Reply::Done)
            }
            Command::ListTables => Ok(Reply::Tables(self.list_tables())),
            Command::Describe { table } => Ok(Reply::Columns(self.describe(&table)?)),
            Command::Insert { table, row } => {
                self.insert(&table, &row)?;
                Ok(Reply::Done)
            }
            Command::SelectAll { table } => Ok(Reply::Rows(self.scan_all(&table)?)),
            Command::SelectById { table, key } => Ok(Reply::Row(self.lookup(&table, &key)?)),
            Command::SelectByColumn {
                table,
                column,
                value,
            } => Ok(Reply::Rows(self.select_by_column(&table, &column, &value)?)),
            Command::Update {
                table,
                key,
                updates,
            } => {
                self.update(&table, &key, &updates)?;
                Ok(Reply::Done)
            }
            Command::Delete { table, key } => {
                self.delete(&table, &key)?;
                Ok(Reply::Done)
            }
            Command::Ping => Ok(Reply::Pong),
        }
    }

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// Create a table from column declarations such as `"amount int"`
    ///
    /// If the table's file already exists on disk (metadata was lost but the
    /// data survived) the file is replayed instead of failing. Metadata is
    /// persisted after the in-memory registration; if that write fails the
    /// table stays registered in memory and the error is returned.
    pub fn create_table<S: AsRef<str>>(&self, name: &str, columns: &[S]) -> Result<()> {
        validate_table_name(name)?;
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        Schema::validate_declarations(&columns)?;

        let mut catalog = self.catalog.write();
        if catalog.schemas.contains_key(name) {
            return Err(LedgerError::TableExists(name.to_string()));
        }

        let index = match self.files.create(name) {
            Ok(()) => HashIndex::new(),
            Err(LedgerError::FileExists(path)) => {
                tracing::warn!(
                    table = name,
                    path = %path.display(),
                    "Table file already on disk, recovering its rows"
                );
                let (index, stats) = Self::replay_table(&self.files, name)?;
                tracing::info!(
                    table = name,
                    live_keys = index.len(),
                    records = stats.records_applied,
                    "Recovered orphaned table log"
                );
                index
            }
            Err(e) => return Err(e),
        };

        catalog.register(Schema::new(TableMetadata::new(name, columns)), index);
        tracing::info!(table = name, "Created table");

        // Keep creators out while persisting, let readers back in
        let catalog = RwLockWriteGuard::downgrade(catalog);
        self.metadata.save(&catalog.metadata_snapshot())
    }

    /// Registered table names, sorted
    pub fn list_tables(&self) -> Vec<String> {
        let catalog = self.catalog.read();
        let mut names: Vec<String> = catalog.schemas.keys().cloned().collect();
        names.sort();
        names
    }

    /// Column declarations of a table
    pub fn describe(&self, table: &str) -> Result<Vec<String>> {
        let catalog = self.catalog.read();
        Ok(catalog.schema(table)?.metadata().columns.clone())
    }

    // =========================================================================
    // Row Operations
    // =========================================================================

    /// Append a row: key, active flag, then column values
    ///
    /// No uniqueness check: inserting an existing key repoints it at the
    /// new record and the old record stays in the log as history.
    pub fn insert<S: AsRef<str>>(&self, table: &str, row: &[S]) -> Result<()> {
        if row.len() < 2 {
            return Err(LedgerError::Validation(format!(
                "row needs at least a key and an active flag, got {} field(s)",
                row.len()
            )));
        }

        row::check_fields(row)?;

        let writer = self.writer(table)?;
        let _writing = writer.lock();

        let offset = self.files.append(table, row)?;
        self.catalog
            .write()
            .index_mut(table)?
            .apply(row[0].as_ref(), row[1].as_ref(), offset);

        tracing::debug!(table, key = row[0].as_ref(), offset, "Inserted row");
        Ok(())
    }

    /// Fetch one row by primary key, truncated to schema width
    ///
    /// The logical lock is released before the disk read. Offsets are never
    /// reused, so a delete racing with this read can at most make it return
    /// the row as it was just before the delete.
    pub fn lookup(&self, table: &str, key: &str) -> Result<Vec<String>> {
        let (offset, width) = {
            let catalog = self.catalog.read();
            let width = catalog.schema(table)?.schema_width();
            (catalog.offset_of(table, key)?, width)
        };

        let mut row = self.files.read(table, offset)?;
        row.truncate(width);
        Ok(row)
    }

    /// Every live row, in log order, truncated to schema width
    ///
    /// Fails as a whole if any single row cannot be read.
    pub fn scan_all(&self, table: &str) -> Result<Vec<Vec<String>>> {
        let (entries, width) = {
            let catalog = self.catalog.read();
            let width = catalog.schema(table)?.schema_width();
            (catalog.index(table)?.by_offset(), width)
        };

        let mut rows = Vec::with_capacity(entries.len());
        for (key, offset) in entries {
            let mut row = self.files.read(table, offset).map_err(|e| {
                tracing::warn!(table, key = %key, offset, "Scan aborted: {}", e);
                e
            })?;
            row.truncate(width);
            rows.push(row);
        }
        Ok(rows)
    }

    /// Overwrite named columns of one row by appending a new version
    ///
    /// Column names match case-insensitively. The first declared column
    /// addresses the stored key field; changing it does not re-key the
    /// index. All names are resolved before anything is written.
    pub fn update<K, V>(&self, table: &str, key: &str, updates: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if updates.is_empty() {
            return Err(LedgerError::Validation("no columns to update".to_string()));
        }

        for (column, value) in updates {
            if value.as_ref().contains(TERMINATOR) {
                return Err(LedgerError::Validation(format!(
                    "value for column {} contains a line break",
                    column.as_ref()
                )));
            }
        }

        let writer = self.writer(table)?;
        let _writing = writer.lock();

        let (offset, width, positions) = {
            let catalog = self.catalog.read();
            let schema = catalog.schema(table)?;
            let offset = catalog.offset_of(table, key)?;

            let mut positions = Vec::with_capacity(updates.len());
            for (column, value) in updates {
                let position = schema.position(column.as_ref()).ok_or_else(|| {
                    LedgerError::Validation(format!(
                        "column {} not found in table {}",
                        column.as_ref(),
                        table
                    ))
                })?;
                positions.push((position, value.as_ref()));
            }
            (offset, schema.data_width(), positions)
        };

        let mut row = self.files.read(table, offset)?;
        row.resize(width, String::new());
        row[1] = FLAG_ACTIVE.to_string();
        for (position, value) in positions {
            row[position] = value.to_string();
        }

        let new_offset = self.files.append(table, &row)?;
        self.catalog.write().index_mut(table)?.insert(key, new_offset);

        tracing::debug!(table, key, offset = new_offset, "Updated row");
        Ok(())
    }

    /// Tombstone one row
    ///
    /// The tombstone carries the row's last values with the flag set to
    /// `"0"`; the key then leaves the index.
    pub fn delete(&self, table: &str, key: &str) -> Result<()> {
        let writer = self.writer(table)?;
        let _writing = writer.lock();

        let (offset, width) = {
            let catalog = self.catalog.read();
            let width = catalog.schema(table)?.schema_width();
            (catalog.offset_of(table, key)?, width)
        };

        let mut row = self.files.read(table, offset)?;
        row.truncate(width);
        if row.len() < 2 {
            return Err(LedgerError::CorruptData(format!(
                "row for key {} in table {} is too short to tombstone",
                key, table
            )));
        }
        row[1] = FLAG_TOMBSTONE.to_string();

        self.files.append(table, &row)?;
        self.catalog.write().index_mut(table)?.remove(key);

        tracing::debug!(table, key, "Deleted row");
        Ok(())
    }

    /// Rows whose column equals `value`, compared case-insensitively
    /// (per-character folding, see `fold_case`)
    ///
    /// Linear in table size; there are no secondary indexes.
    pub fn select_by_column(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<Vec<String>>> {
        let position = {
            let catalog = self.catalog.read();
            catalog
                .schema(table)?
                .position(column)
                .ok_or_else(|| LedgerError::ColumnNotFound {
                    table: table.to_string(),
                    column: column.to_string(),
                })?
        };

        let wanted = fold_case(value);
        let rows = self
            .scan_all(table)?
            .into_iter()
            .filter(|row| {
                row.get(position)
                    .map_or(false, |field| fold_case(field) == wanted)
            })
            .collect();
        Ok(rows)
    }

    /// Sync every table file and shut the engine down
    pub fn close(self) -> Result<()> {
        let tables = self.list_tables();
        for table in &tables {
            self.files.sync(table)?;
        }
        tracing::info!(tables = tables.len(), "Engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Path of a table's log file
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.files.path(table)
    }

    /// Copy of a table's current index
    pub fn index_snapshot(&self, table: &str) -> Result<HashIndex> {
        Ok(self.catalog.read().index(table)?.clone())
    }

    /// Number of live keys in a table
    pub fn live_count(&self, table: &str) -> Result<usize> {
        Ok(self.catalog.read().index(table)?.len())
    }

    /// Tables whose index could not be rebuilt during `open`
    pub fn recovery_failures(&self) -> &[String] {
        &self.recovery_failures
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
