//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Length-Prefixed bincode)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: CREATE_TABLE      0x06: SELECT_BY_ID
//! - 0x02: LIST_TABLES       0x07: SELECT_BY_COLUMN
//! - 0x03: DESCRIBE          0x08: UPDATE
//! - 0x04: INSERT            0x09: DELETE
//! - 0x05: SELECT_ALL        0x0A: PING
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: CLIENT_ERROR (validation, already exists)
//! - 0x03: SERVER_ERROR (integrity, corruption, I/O)

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Reply, Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
