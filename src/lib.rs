//! # LedgerDB
//!
//! A minimal persistent table store with:
//! - Append-only, checksummed log files (one per table)
//! - In-memory hash indexes from primary key to byte offset
//! - Tombstone-based deletes
//! - Crash recovery by full log replay
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Worker Thread Pool)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        logical lock: RwLock<{schemas, indexes}>              │
//! └──────────┬─────────────────────┬──────────────────┬─────────┘
//!            │                     │                  │
//!            ▼                     ▼                  ▼
//!   ┌─────────────────┐   ┌─────────────────┐  ┌─────────────┐
//!   │     Catalog     │   │   Hash Index    │  │ Table Files │
//!   │ (metadata.json) │   │ (key → offset)  │  │  (physical  │
//!   └─────────────────┘   └────────▲────────┘  │    lock)    │
//!                                  │ replay    └──────┬──────┘
//!                                  └──────────────────┘
//!                                          │
//!                                          ▼
//!                                  ┌─────────────┐
//!                                  │  Row Codec  │
//!                                  │  (SHA-256)  │
//!                                  └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod row;
pub mod table;
pub mod index;
pub mod catalog;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorClass, LedgerError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LedgerDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
