//! LedgerDB Server Binary
//!
//! Opens the engine, replays every table, and serves TCP clients.

use std::sync::Arc;

use clap::Parser;
use ledgerdb::config::SyncStrategy;
use ledgerdb::network::Server;
use ledgerdb::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// LedgerDB Server
#[derive(Parser, Debug)]
#[command(name = "ledgerdb-server")]
#[command(about = "Persistent table store with append-only logs and hash indexes")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./ledgerdb_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    listen: String,

    /// Maximum queued connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Leave flushing to the OS instead of syncing every append
    #[arg(long)]
    no_sync: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ledgerdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("LedgerDB Server v{}", ledgerdb::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = if args.no_sync {
        SyncStrategy::OsBuffered
    } else {
        SyncStrategy::EveryWrite
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .sync_strategy(sync_strategy)
        .build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    for table in engine.recovery_failures() {
        tracing::warn!("Table {} started with an empty index", table);
    }

    let server = match Server::bind(config, Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    drop(server);
    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.close() {
                tracing::error!("Failed to close engine: {}", e);
            }
        }
        Err(_) => tracing::warn!("Engine still shared at shutdown, skipping final sync"),
    }
}
