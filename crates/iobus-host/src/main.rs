//! IOBus host: entry point.
//!
//! Listens for senders on TCP and injects every event they send into this
//! machine's keyboard, pointer and power controls.
//!
//! # Usage
//!
//! ```text
//! iobus-host [OPTIONS]
//!
//! Options:
//!   --config <PATH>              Config file [default: platform config dir]
//!   --bind <IP>                  Address to listen on [default: 0.0.0.0]
//!   --port <PORT>                Port to listen on [default: 8765]
//!   --max-line-bytes <BYTES>     Longest accepted line [default: 65536]
//!   --read-timeout-secs <SECS>   Close idle connections; 0 = never [default: 0]
//!   --backend <auto|log|macos>   Injection backend [default: auto]
//! ```
//!
//! Command-line values override the config file, which overrides the built-in
//! defaults.
//!
//! | Variable          | Flag         |
//! |-------------------|--------------|
//! | `IOBUS_CONFIG`    | `--config`   |
//! | `IOBUS_BIND`      | `--bind`     |
//! | `IOBUS_PORT`      | `--port`     |
//! | `IOBUS_BACKEND`   | `--backend`  |
//!
//! The log level comes from `RUST_LOG` when set, else from `host.log_level`
//! in the config file.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use iobus_host::application::DispatchEventUseCase;
use iobus_host::domain::HostConfig;
use iobus_host::infrastructure::injection::{build_backend, BackendKind};
use iobus_host::infrastructure::network::run_server;
use iobus_host::infrastructure::storage::config::{load_config, HostFileConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// IOBus input host.
///
/// Every option is optional; anything left unset comes from the config file.
#[derive(Debug, Parser)]
#[command(
    name = "iobus-host",
    about = "Accepts JSON input events over TCP and injects them locally",
    version
)]
struct Cli {
    /// Path to the TOML config file.  Must exist when given.
    #[arg(long, env = "IOBUS_CONFIG")]
    config: Option<PathBuf>,

    /// IP address to listen on.
    ///
    /// `0.0.0.0` accepts senders from any interface; `127.0.0.1` only local
    /// ones.
    #[arg(long, env = "IOBUS_BIND")]
    bind: Option<String>,

    /// TCP port to listen on.
    #[arg(long, env = "IOBUS_PORT")]
    port: Option<u16>,

    /// Longest accepted line in bytes.  Longer lines are dropped.
    #[arg(long)]
    max_line_bytes: Option<usize>,

    /// Close a connection after this many idle seconds.  0 disables.
    #[arg(long)]
    read_timeout_secs: Option<u64>,

    /// Injection backend.
    #[arg(long, value_enum, env = "IOBUS_BACKEND")]
    backend: Option<BackendKind>,
}

impl Cli {
    /// Overwrites the file settings with every option given on the command
    /// line.
    fn apply_to(&self, file: &mut HostFileConfig) {
        if let Some(bind) = &self.bind {
            file.network.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            file.network.port = port;
        }
        if let Some(max) = self.max_line_bytes {
            file.network.max_line_bytes = max;
        }
        if let Some(secs) = self.read_timeout_secs {
            file.network.read_timeout_secs = secs;
        }
        if let Some(backend) = self.backend {
            file.host.backend = backend;
        }
    }

    /// Loads the config file and merges the command line over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the resulting bind address is not a valid IP address.
    fn resolve(&self) -> anyhow::Result<(HostFileConfig, HostConfig)> {
        let mut file = load_config(self.config.as_deref()).context("failed to load config")?;
        self.apply_to(&mut file);
        let host = file.to_host_config().context("invalid configuration")?;
        Ok((file, host))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Parses the command line and loads the config file.
/// 2. Initialises `tracing_subscriber` (`RUST_LOG` wins over the config file).
/// 3. Builds the injection backend.
/// 4. Spawns a Ctrl+C handler that clears the shared `running` flag.
/// 5. Runs the accept loop until the flag is cleared.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (file, config) = cli.resolve()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&file.host.log_level)),
        )
        .init();

    let backend_kind = file.host.backend.resolve();
    let backend = build_backend(backend_kind)
        .with_context(|| format!("cannot start the {backend_kind} injection backend"))?;
    let dispatcher = DispatchEventUseCase::new(backend);

    info!(
        "IOBus host starting: bind={}, backend={backend_kind}, max_line_bytes={}, read_timeout={:?}",
        config.bind_addr, config.limits.max_line_bytes, config.limits.read_timeout
    );

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    // The accept loop checks `running` every 200 ms and exits once it is
    // cleared.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; stopping");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, dispatcher, running).await?;

    info!("IOBus host stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
