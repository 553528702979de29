//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorClass, LedgerError};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    ClientError = 0x02,
    ServerError = 0x03,
}

impl Status {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotFound),
            0x02 => Some(Status::ClientError),
            0x03 => Some(Status::ServerError),
            _ => None,
        }
    }
}

/// Result data of a successful command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// Mutation applied, nothing to return
    Done,

    /// Sorted table names
    Tables(Vec<String>),

    /// Column declarations of one table
    Columns(Vec<String>),

    /// A single row
    Row(Vec<String>),

    /// Zero or more rows
    Rows(Vec<Vec<String>>),

    /// Answer to `Ping`
    Pong,

    /// Error description (non-OK statuses)
    Error(String),
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Reply body
    pub reply: Reply,
}

impl Response {
    /// Create an OK response
    pub fn ok(reply: Reply) -> Self {
        Self {
            status: Status::Ok,
            reply,
        }
    }

    /// Create an error response with the status implied by the error's class
    pub fn from_error(err: &LedgerError) -> Self {
        let status = if err.is_not_found() {
            Status::NotFound
        } else {
            match err.class() {
                ErrorClass::Client => Status::ClientError,
                ErrorClass::Server => Status::ServerError,
            }
        };
        Self {
            status,
            reply: Reply::Error(err.to_string()),
        }
    }

    /// Create a SERVER_ERROR response from a bare message
    pub fn server_error(message: &str) -> Self {
        Self {
            status: Status::ServerError,
            reply: Reply::Error(message.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}
