//! Load balancer facade.
//!
//! Owns the registry, selector, transport and metrics, and is the single
//! entry point for the HTTP server, the binary and embedding code.

use axum::body::Body;
use axum::http::{Request, Response};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::{BalancerConfig, HealthCheckConfig};
use crate::error::{DispatchError, LoadBalancerError};
use crate::health::{HealthProbe, HealthReport};
use crate::http::dispatcher::RequestDispatcher;
use crate::load_balancer::{BackendRegistry, RoundRobin};
use crate::net::{HttpTransport, Transport};
use crate::observability::{MetricsCollector, MetricsSnapshot};

pub struct LoadBalancer {
    registry: Arc<BackendRegistry>,
    metrics: Arc<MetricsCollector>,
    dispatcher: RequestDispatcher,
    health_config: HealthCheckConfig,
}

impl LoadBalancer {
    /// Build from configuration. Malformed backends are skipped; having
    /// none left is an error.
    pub fn new(config: &BalancerConfig) -> Result<Self, LoadBalancerError> {
        let registry = BackendRegistry::from_addresses(config.backends.as_slice())?;
        let transport = HttpTransport::new(config.timeouts.upstream(), config.timeouts.idle());

        tracing::info!(backends = registry.len(), "Load balancer configured");

        Ok(Self::from_parts(
            registry,
            Arc::new(transport),
            config.health_check.clone(),
        ))
    }

    /// Assemble from an existing registry and transport.
    pub fn from_parts(
        registry: BackendRegistry,
        transport: Arc<dyn Transport>,
        health_config: HealthCheckConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        let metrics = Arc::new(MetricsCollector::new());
        let dispatcher = RequestDispatcher::new(
            registry.clone(),
            Arc::new(RoundRobin::new()),
            transport,
            metrics.clone(),
        );

        Self {
            registry,
            metrics,
            dispatcher,
            health_config,
        }
    }

    pub async fn dispatch(&self, request: Request<Body>) -> Result<Response<Body>, DispatchError> {
        self.dispatcher.dispatch(request).await
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    pub fn health_report(&self) -> HealthReport {
        HealthReport::from_registry(&self.registry)
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn health_probe(&self) -> HealthProbe {
        HealthProbe::from_config(self.registry.clone(), &self.health_config)
    }

    /// Start the background probe, or return `None` when health checks are
    /// disabled.
    pub fn spawn_health_probe(&self, shutdown: broadcast::Receiver<()>) -> Option<JoinHandle<()>> {
        if !self.health_config.enabled {
            tracing::info!("Active health checks disabled");
            return None;
        }
        Some(tokio::spawn(self.health_probe().run(shutdown)))
    }
}
