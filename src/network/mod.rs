//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls the shutdown flag)
//! - Worker thread pool fed through a bounded crossbeam channel
//! - Commands routed through Engine

mod server;
mod connection;
mod client;

pub use server::Server;
pub use connection::Connection;
pub use client::Client;
