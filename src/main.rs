//! Fan-out HTTP proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                 FAN-OUT PROXY                 │
//!   Client Request       │  ┌────────┐   ┌──────────┐   ┌────────────┐  │      ┌───────────┐
//!   ─────────────────────┼─▶│  http  │──▶│ registry │──▶│ replicator │──┼─────▶│ backend A │
//!                        │  │ server │   │ snapshot │   └─────┬──────┘  │  ┌──▶│ backend B │
//!                        │  └────────┘   └──────────┘         │         │  │   │ backend C │
//!                        │       ▲                            ▼         │  │   └─────┬─────┘
//!   Client Response      │  ┌────────┐                 ┌────────────┐   │  │         │
//!   ◀────────────────────┼──│ relay  │◀── first 2xx ───│    race    │───┼──┘         │
//!                        │  └────────┘                 │coordinator │◀──┼────────────┘
//!                        │                             └────────────┘   │  completions
//!                        │  admin: POST /-update-backends → registry    │
//!                        └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use fanout_proxy::config::{backends_from_env, load_config, validation::validate_config, ConfigError};
use fanout_proxy::observability::{logging, metrics};
use fanout_proxy::{BackendRegistry, HttpServer, ProxyConfig, Shutdown};

#[derive(Parser)]
#[command(name = "fanout-proxy", version)]
#[command(about = "Replicates each request to every backend and relays the first success")]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = ProxyConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("fanout-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let backends = match backends_from_env() {
        Ok(backends) => backends,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start without backends");
            return Err(e.into());
        }
    };
    // Before the registry: it publishes its size on construction.
    if config.observability.metrics_enabled {
        // Validated above.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }
    let registry = Arc::new(BackendRegistry::new(backends)?);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = ?registry.snapshot().iter().map(|b| b.base_url()).collect::<Vec<_>>(),
        attempt_timeout_ms = config.fanout.attempt_timeout_ms,
        max_body_bytes = config.fanout.max_body_bytes,
        cancel_losers = config.fanout.cancel_losers,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config, registry);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
