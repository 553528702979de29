//! Command definitions
//!
//! Represents already-parsed requests from clients.

use serde::{Deserialize, Serialize};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    CreateTable = 0x01,
    ListTables = 0x02,
    Describe = 0x03,
    Insert = 0x04,
    SelectAll = 0x05,
    SelectById = 0x06,
    SelectByColumn = 0x07,
    Update = 0x08,
    Delete = 0x09,
    Ping = 0x0A,
}

impl CommandType {
    /// Map a header byte back to a command type
    pub fn from_byte(byte: u8) -> Option<Self> {
        let kind = match byte {
            0x01 => CommandType::CreateTable,
            0x02 => CommandType::ListTables,
            0x03 => CommandType::Describe,
            0x04 => CommandType::Insert,
            0x05 => CommandType::SelectAll,
            0x06 => CommandType::SelectById,
            0x07 => CommandType::SelectByColumn,
            0x08 => CommandType::Update,
            0x09 => CommandType::Delete,
            0x0A => CommandType::Ping,
            _ => return None,
        };
        Some(kind)
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Create a table from column declarations (`"name type"`)
    CreateTable { name: String, columns: Vec<String> },

    /// List table names, sorted
    ListTables,

    /// Show a table's column declarations
    Describe { table: String },

    /// Append a row: key, active flag, then column values
    Insert { table: String, row: Vec<String> },

    /// Every live row in log order
    SelectAll { table: String },

    /// One row by primary key
    SelectById { table: String, key: String },

    /// Rows whose column equals a value (case-insensitive)
    SelectByColumn {
        table: String,
        column: String,
        value: String,
    },

    /// Overwrite named columns of one row
    Update {
        table: String,
        key: String,
        updates: Vec<(String, String)>,
    },

    /// Tombstone one row
    Delete { table: String, key: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::CreateTable { .. } => CommandType::CreateTable,
            Command::ListTables => CommandType::ListTables,
            Command::Describe { .. } => CommandType::Describe,
            Command::Insert { .. } => CommandType::Insert,
            Command::SelectAll { .. } => CommandType::SelectAll,
            Command::SelectById { .. } => CommandType::SelectById,
            Command::SelectByColumn { .. } => CommandType::SelectByColumn,
            Command::Update { .. } => CommandType::Update,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
        }
    }
}
