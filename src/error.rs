//! Error types for LedgerDB
//!
//! Provides a unified error type for all operations, plus the
//! client/server classification used at the transport boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Unified error type for LedgerDB operations
#[derive(Debug, Error)]
pub enum LedgerError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Table {0} does not exist")]
    TableNotFound(String),

    #[error("Record with id {key} not found in table {table}")]
    KeyNotFound { table: String, key: String },

    #[error("Column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },

    // -------------------------------------------------------------------------
    // Creation Errors
    // -------------------------------------------------------------------------
    #[error("Table {0} already exists")]
    TableExists(String),

    #[error("Table file {} already exists", .0.display())]
    FileExists(PathBuf),

    // -------------------------------------------------------------------------
    // Data Errors
    // -------------------------------------------------------------------------
    #[error("Integrity check failed: stored checksum {stored}, computed {computed}")]
    Integrity { stored: String, computed: String },

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Which side of the transport boundary an error is blamed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input from the caller (validation, not found, already exists)
    Client,
    /// Failure inside the store (integrity, corruption, I/O)
    Server,
}

impl LedgerError {
    /// Classify this error for the transport layer
    pub fn class(&self) -> ErrorClass {
        match self {
            LedgerError::Validation(_)
            | LedgerError::TableNotFound(_)
            | LedgerError::KeyNotFound { .. }
            | LedgerError::ColumnNotFound { .. }
            | LedgerError::TableExists(_)
            | LedgerError::FileExists(_)
            | LedgerError::Protocol(_) => ErrorClass::Client,
            LedgerError::Io(_)
            | LedgerError::Integrity { .. }
            | LedgerError::CorruptData(_)
            | LedgerError::Metadata(_)
            | LedgerError::Config(_) => ErrorClass::Server,
        }
    }

    /// True for the not-found family (unknown table, key, or column)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::TableNotFound(_)
                | LedgerError::KeyNotFound { .. }
                | LedgerError::ColumnNotFound { .. }
        )
    }

    /// True for the already-exists family (table or backing file)
    pub fn is_already_exists(&self) -> bool {
        matches!(self, LedgerError::TableExists(_) | LedgerError::FileExists(_))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Metadata(e.to_string())
    }
}
