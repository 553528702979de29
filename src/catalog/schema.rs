//! Table metadata and schemas

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Persisted description of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name
    pub name: String,

    /// Column declarations in order, e.g. `"amount int"`
    pub columns: Vec<String>,
}

impl TableMetadata {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// One parsed column declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name (matched case-insensitively)
    pub name: String,

    /// Free-form type label; stored, never interpreted
    pub type_label: String,
}

impl ColumnDef {
    /// Parse `"name type label"`: first whitespace-separated token is the name
    pub fn parse(declaration: &str) -> Self {
        let trimmed = declaration.trim();
        let (name, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));
        Self {
            name: name.to_string(),
            type_label: rest.trim().to_string(),
        }
    }
}

/// Schema built once per table: column declarations plus name → row position
#[derive(Debug, Clone)]
pub struct Schema {
    metadata: TableMetadata,
    columns: Vec<ColumnDef>,
    positions: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from metadata
    ///
    /// When two declarations share a name, the first one wins.
    pub fn new(metadata: TableMetadata) -> Self {
        let columns: Vec<ColumnDef> = metadata
            .columns
            .iter()
            .map(|c| ColumnDef::parse(c))
            .collect();

        let mut positions = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let position = if i == 0 { 0 } else { i + 1 };
            positions
                .entry(fold_case(&column.name))
                .or_insert(position);
        }

        Self {
            metadata,
            columns,
            positions,
        }
    }

    /// Check a set of declarations before a table is created
    pub fn validate_declarations(columns: &[String]) -> Result<()> {
        if columns.is_empty() {
            return Err(LedgerError::Validation(
                "a table needs at least one column".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for declaration in columns {
            let column = ColumnDef::parse(declaration);
            if column.name.is_empty() {
                return Err(LedgerError::Validation(format!(
                    "empty column declaration {:?}",
                    declaration
                )));
            }
            if column.name.contains(crate::row::DELIMITER) {
                return Err(LedgerError::Validation(format!(
                    "column name {} contains the field delimiter",
                    column.name
                )));
            }
            if !seen.insert(fold_case(&column.name)) {
                return Err(LedgerError::Validation(format!(
                    "duplicate column {}",
                    column.name
                )));
            }
        }
        Ok(())
    }

    /// Row position for a column name (case-insensitive)
    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(&fold_case(column)).copied()
    }

    /// Fields returned to readers: key + flag + declared columns
    pub fn schema_width(&self) -> usize {
        self.columns.len() + 2
    }

    /// Fields written by an update: key + flag + non-key columns
    pub fn data_width(&self) -> usize {
        self.columns.len() + 1
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }
}

/// Case-fold a name or value for case-insensitive comparison
///
/// Folds one character at a time, so context-dependent lowercasing (such as
/// a word-final sigma) does not apply. The final sigma folds to `σ` so all
/// three sigma forms compare equal. There is no full folding: `ß` never
/// expands to `ss`.
pub fn fold_case(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ς' { 'σ' } else { c })
        .collect()
}

/// Table names become file names, so keep them to a safe alphabet
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LedgerError::Validation("table name is empty".to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(LedgerError::Validation(format!(
            "invalid table name {:?}: use ASCII letters, digits, '_' or '-'",
            name
        )));
    }
    Ok(())
}
