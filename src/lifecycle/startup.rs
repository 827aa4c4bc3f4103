//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Build the header policy and the HTTP server
//! - Start the config watcher and the signal listener
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use metrics_exporter_prometheus::BuildError;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::util::TryInitError;

use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config, ConfigError, ServerConfig};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals::shutdown_signal, Shutdown};
use crate::observability::{logging, metrics};

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] TryInitError),

    #[error("invalid metrics address `{address}`: {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to watch configuration file: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Options gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// TOML configuration file; defaults are used when absent.
    pub config_path: Option<PathBuf>,

    /// Reload the security policy when the configuration file changes.
    pub watch: bool,
}

/// Run the server until a shutdown signal arrives.
pub async fn start(options: StartupOptions) -> Result<(), StartupError> {
    let config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "secure-headers starting");
    tracing::info!(
        config_path = ?options.config_path,
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        headers_enabled = config.security.enable_headers,
        hsts_seconds = config.security.hsts_seconds,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr: SocketAddr = address.parse().map_err(|source| StartupError::MetricsAddress {
            address: address.clone(),
            source,
        })?;
        metrics::init_metrics(addr)?;
    }

    // The watcher stops when dropped, so it lives until `start` returns.
    let (_watcher, config_updates) = match (&options.config_path, options.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    let tls = config.listener.tls.is_some();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    if tls {
        server.run_tls(config_updates, server_shutdown).await?;
    } else {
        let listener = TcpListener::bind(&bind_address)
            .await
            .map_err(ServerError::Io)?;
        server.run(listener, config_updates, server_shutdown).await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
