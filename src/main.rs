//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  LOAD BALANCER                   │
//!                        │                                                  │
//!     Client Request     │  ┌──────────┐   ┌────────────┐   ┌────────────┐  │
//!     ───────────────────┼─▶│   http   │──▶│ dispatcher │──▶│ round_robin│  │
//!                        │  │  server  │   │            │   │  + registry│  │
//!                        │  └──────────┘   └─────┬──────┘   └────────────┘  │
//!                        │                       │                          │
//!                        │                       ▼                          │
//!     Client Response    │                 ┌────────────┐                   │
//!     ◀──────────────────┼─────────────────│ transport  │◀──────────────────┼──── Backend
//!                        │                 └────────────┘                   │
//!                        │                                                  │
//!                        │  ┌────────────┐ ┌─────────────┐ ┌─────────────┐  │
//!                        │  │   health   │ │observability│ │  lifecycle  │  │
//!                        │  │   probe    │ │ log+metrics │ │  shutdown   │  │
//!                        │  └────────────┘ └─────────────┘ └─────────────┘  │
//!                        └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use rr_balancer::config::{load_config, validation::validate_config, BalancerConfig, ConfigError};
use rr_balancer::lifecycle::{wait_for_termination, Shutdown};
use rr_balancer::observability::{logging::init_logging, metrics::init_metrics};
use rr_balancer::{HttpServer, LoadBalancer};

#[derive(Parser)]
#[command(name = "rr-balancer", version, about = "Round-robin HTTP load balancer")]
struct Args {
    /// Path to the TOML configuration file (defaults apply if missing).
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the listen address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the backend list (repeatable).
    #[arg(long = "backend")]
    backends: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The subscriber needs a level before the config is known to be good.
    let loaded = load_config(&args.config);
    let log_level = match &loaded {
        Ok(config) => config.observability.log_level.clone(),
        Err(_) => BalancerConfig::default().observability.log_level,
    };
    init_logging(&log_level);

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(config_file = %args.config.display(), error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    if !args.config.exists() {
        tracing::info!(config_file = %args.config.display(), "Config file not found, using defaults");
    }

    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if !args.backends.is_empty() {
        config.backends = args.backends;
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return Err(ConfigError::Validation(errors).into());
    }

    tracing::info!("rr-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = %args.config.display(),
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        "Configuration loaded"
    );

    let balancer = Arc::new(LoadBalancer::new(&config)?);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start Prometheus exporter");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(balancer.clone());
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = wait_for_termination() => result?,
        joined = &mut server_task => {
            joined??;
            tracing::warn!("HTTP server stopped before a termination signal");
            return Ok(());
        }
    }

    shutdown.trigger();

    let deadline = config.timeouts.shutdown_deadline();
    match tokio::time::timeout(deadline, server_task).await {
        Ok(Ok(Ok(()))) => tracing::info!("Server exited gracefully"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server failed while shutting down"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task aborted"),
        Err(_) => tracing::warn!(deadline = ?deadline, "Shutdown deadline exceeded, forcing exit"),
    }

    let snapshot = balancer.metrics_snapshot();
    tracing::info!(
        total_requests = snapshot.total_requests,
        success_requests = snapshot.success_requests,
        failed_requests = snapshot.failed_requests,
        "Shutdown complete"
    );
    Ok(())
}
