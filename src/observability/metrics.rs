//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count dispatch outcomes for the `/metrics` endpoint
//! - Mirror per-request and per-backend data into the `metrics` facade
//! - Optionally expose a Prometheus scrape endpoint
//!
//! # Metrics
//! - `lb_requests_total` (counter): dispatches by method, status, backend
//! - `lb_request_duration_seconds` (histogram): dispatch latency
//! - `lb_backend_alive` (gauge): 1=alive, 0=dead
//!
//! # Design Decisions
//! - Counters are independent atomics; no cross-field lock
//! - The collector is an explicit instance owned by the balancer
//! - Facade calls are no-ops until an exporter is installed

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Running dispatch counters.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    total: AtomicU64,
    success: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time view of [`MetricsCollector`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub success_requests: u64,
    pub failed_requests: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one dispatched request.
    pub fn record_outcome(&self, success: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// The three counters are read independently and may briefly disagree
    /// while updates are in flight.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total.load(Ordering::Relaxed),
            success_requests: self.success.load(Ordering::Relaxed),
            failed_requests: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    metrics::counter!(
        "lb_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "lb_request_duration_seconds",
        "method" => method.to_string(),
        "backend" => backend.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_health(backend: &str, alive: bool) {
    metrics::gauge!("lb_backend_alive", "backend" => backend.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}
