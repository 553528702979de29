//! TCP Server
//!
//! Accepts connections and dispatches them to a pool of worker threads.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver};

use super::Connection;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// TCP server for LedgerDB
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listen address from the config
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Flag that stops `run` when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Start the server (blocking until shutdown)
    ///
    /// Accepted streams are queued on a bounded channel; when the queue is
    /// full the accept loop blocks until a worker frees up.
    pub fn run(&self) -> Result<()> {
        let (tx, rx) = bounded::<TcpStream>(self.config.max_connections);

        let workers: Vec<JoinHandle<()>> = (0..self.config.worker_threads)
            .map(|id| self.spawn_worker(id, rx.clone()))
            .collect::<io::Result<_>>()?;
        drop(rx);

        tracing::info!(
            addr = %self.local_addr()?,
            workers = workers.len(),
            "Server listening"
        );

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    stream.set_nonblocking(false)?;
                    tracing::trace!("Accepted connection from {}", peer);
                    if tx.send(stream).is_err() {
                        tracing::error!("All workers exited, stopping accept loop");
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        // Closing the channel lets idle workers exit
        drop(tx);
        for worker in workers {
            let _ = worker.join();
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> io::Result<JoinHandle<()>> {
        let engine = Arc::clone(&self.engine);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        thread::Builder::new()
            .name(format!("ledgerdb-worker-{}", id))
            .spawn(move || {
                for stream in rx.iter() {
                    let result = Connection::new(stream, Arc::clone(&engine)).and_then(|mut conn| {
                        conn.set_timeouts(read_ms, write_ms)?;
                        conn.handle()
                    });
                    if let Err(e) = result {
                        tracing::debug!(worker = id, "Connection ended with error: {}", e);
                    }
                }
            })
    }
}
