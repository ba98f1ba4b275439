//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend, dead ones included
//! - Update backend liveness based on results
//! - Stop cleanly on the shutdown signal

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::load_balancer::BackendRegistry;
use crate::observability::metrics::record_backend_health;

/// Why a reachability probe failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connect(#[from] std::io::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Check that `authority` (`host:port`) accepts a TCP connection within
/// `timeout`.
pub async fn probe(authority: &str, timeout: Duration) -> Result<(), ProbeError> {
    match time::timeout(timeout, TcpStream::connect(authority)).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(ProbeError::Connect(e)),
        Err(_) => Err(ProbeError::Timeout(timeout)),
    }
}

/// Shortest pause between passes; `tokio::time::interval` rejects zero.
pub const MIN_PROBE_INTERVAL: Duration = Duration::from_millis(10);

/// Background loop that keeps registry liveness in sync with reachability.
pub struct HealthProbe {
    registry: Arc<BackendRegistry>,
    interval: Duration,
    timeout: Duration,
}

impl HealthProbe {
    /// Intervals below [`MIN_PROBE_INTERVAL`] are raised to it.
    pub fn new(registry: Arc<BackendRegistry>, interval: Duration, timeout: Duration) -> Self {
        if interval < MIN_PROBE_INTERVAL {
            tracing::warn!(
                requested = ?interval,
                using = ?MIN_PROBE_INTERVAL,
                "Health check interval too short, clamping"
            );
        }
        Self {
            registry,
            interval: interval.max(MIN_PROBE_INTERVAL),
            timeout,
        }
    }

    pub fn from_config(registry: Arc<BackendRegistry>, config: &HealthCheckConfig) -> Self {
        Self::new(registry, config.interval(), config.timeout())
    }

    /// Run until the shutdown signal fires or its sender is dropped.
    ///
    /// The signal is checked between passes; a pass in progress always
    /// finishes, and nothing is written after this returns.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            timeout = ?self.timeout,
            backends = self.registry.len(),
            "Health probe starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Health probe received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    self.check_all().await;
                }
            }
        }
    }

    /// Probe every backend concurrently, then apply all results.
    pub async fn check_all(&self) {
        let mut probes = JoinSet::new();
        for (index, backend) in self.registry.backends().iter().enumerate() {
            let authority = backend.authority().to_string();
            let timeout = self.timeout;
            probes.spawn(async move { (index, probe(&authority, timeout).await) });
        }

        let mut results = Vec::with_capacity(self.registry.len());
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!(error = %e, "Health probe task failed"),
            }
        }

        for (index, result) in results {
            self.apply(index, result);
        }
    }

    fn apply(&self, index: usize, result: Result<(), ProbeError>) {
        let Some(backend) = self.registry.get(index) else {
            return;
        };
        let alive = result.is_ok();
        let was_alive = self.registry.set_alive(index, alive).unwrap_or(alive);

        match result {
            Ok(()) if !was_alive => {
                tracing::info!(backend = %backend.address(), "Backend recovered");
            }
            Err(e) if was_alive => {
                tracing::warn!(backend = %backend.address(), error = %e, "Backend failed health check, marking down");
            }
            Ok(()) => tracing::debug!(backend = %backend.address(), "Health check: up"),
            Err(e) => tracing::debug!(backend = %backend.address(), error = %e, "Health check: down"),
        }

        record_backend_health(backend.address(), alive);
    }
}
