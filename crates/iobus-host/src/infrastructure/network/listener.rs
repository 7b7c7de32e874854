//! TCP accept loop.
//!
//! Binds the configured address, then accepts connections until the shared
//! `running` flag is cleared.  Every accepted connection gets its own Tokio
//! task running [`handle_connection`], so one slow or silent sender never
//! delays the others.  Connection tasks share nothing except the injection
//! backend behind [`DispatchEventUseCase`].
//!
//! Shutdown is triggered by a shared `AtomicBool` that the Ctrl+C handler in
//! `main.rs` clears.  The loop stops accepting within one poll interval;
//! connection tasks already running are not drained.

use std::io;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{error, info, info_span, warn, Instrument};

use crate::application::dispatch_event::DispatchEventUseCase;
use crate::domain::config::{ConnectionLimits, HostConfig};

use super::connection::{handle_connection, ConnectionEnd, ConnectionSummary};
use super::ConnectionId;

/// How often the accept loop re-checks the `running` flag when idle.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Pause after a failed `accept()` so a persistent error (EMFILE) does not
/// spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Errors that stop the listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// A bound, not yet serving, TCP listener.
///
/// Binding and serving are split so callers (and tests binding port 0) can
/// learn the real local address before connections are accepted.
#[derive(Debug)]
pub struct HostListener {
    listener: TcpListener,
    limits: ConnectionLimits,
}

impl HostListener {
    /// Binds `config.bind_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Bind`] if the address is in use or the process
    /// lacks permission to bind it.
    pub async fn bind(config: &HostConfig) -> Result<Self, ListenerError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| ListenerError::Bind {
                addr: config.bind_addr,
                source,
            })?;
        Ok(Self {
            listener,
            limits: config.limits,
        })
    }

    /// The address actually bound, which differs from the configured one when
    /// port 0 was requested.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `running` is set to `false`.
    pub async fn serve(self, dispatcher: DispatchEventUseCase, running: Arc<AtomicBool>) {
        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            // A short timeout on `accept()` lets the loop notice the flag even
            // when nobody is connecting.
            match timeout(ACCEPT_POLL_INTERVAL, self.listener.accept()).await {
                Ok(Ok((stream, peer_addr))) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!(%peer_addr, "failed to set TCP_NODELAY: {e}");
                    }
                    let conn = ConnectionId::new();
                    let span = info_span!("connection", %conn, peer = %peer_addr);
                    let dispatcher = dispatcher.clone();
                    let limits = self.limits;

                    tokio::spawn(
                        async move {
                            info!("connected");
                            let summary = handle_connection(stream, &dispatcher, limits).await;
                            log_summary(&summary);
                        }
                        .instrument(span),
                    );
                }
                Ok(Err(e)) => backoff_after_accept_error(&e).await,
                Err(_) => {
                    // No new connection within the poll interval.
                }
            }
        }
    }
}

/// Logs a failed `accept()` and waits before the next attempt.  Errors such as
/// running out of file descriptors are usually transient, so the loop keeps
/// going.
async fn backoff_after_accept_error(e: &io::Error) {
    error!("accept error: {e}");
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

fn log_summary(summary: &ConnectionSummary) {
    let processed = summary.messages_processed;
    let rejected = summary.messages_rejected;
    let skipped = summary.lines_skipped;
    match &summary.end {
        ConnectionEnd::PeerClosed => info!(processed, rejected, skipped, "disconnected"),
        ConnectionEnd::Failed(e) => warn!(processed, rejected, skipped, "disconnected: {e}"),
    }
}

/// Binds `config.bind_addr` and runs the accept loop until `running` is set
/// to `false`.
///
/// # Errors
///
/// Returns [`ListenerError::Bind`] if the listener cannot be bound.  Nothing
/// that happens on an individual connection is an error here.
pub async fn run_server(
    config: HostConfig,
    dispatcher: DispatchEventUseCase,
    running: Arc<AtomicBool>,
) -> Result<(), ListenerError> {
    let listener = HostListener::bind(&config).await?;
    match listener.local_addr() {
        Ok(addr) => info!("host listening on {addr}"),
        Err(_) => info!("host listening on {}", config.bind_addr),
    }
    listener.serve(dispatcher, running).await;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
