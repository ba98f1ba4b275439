//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: status endpoints plus the proxy fallback
//! - Wire up middleware (tracing, request ID)
//! - Start the health probe alongside the listener
//! - Drain connections on shutdown

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::balancer::LoadBalancer;
use crate::http::request::RequestIdLayer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub balancer: Arc<LoadBalancer>,
}

/// HTTP front end for the load balancer.
pub struct HttpServer {
    router: Router,
    balancer: Arc<LoadBalancer>,
}

impl HttpServer {
    /// No outer timeout wraps the proxy: the transport deadline fires first
    /// so a stalled backend is answered with 502, counted and demoted.
    pub fn new(balancer: Arc<LoadBalancer>) -> Self {
        let state = AppState {
            balancer: balancer.clone(),
        };
        let router = Self::build_router(state);
        Self { router, balancer }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", any(health_handler))
            .route("/metrics", any(metrics_handler))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    ///
    /// The health probe is started first and stopped as soon as the signal
    /// arrives (or serving fails), then awaited after the listener drains.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        // Relay channel: subscribed before spawning so the probe cannot miss it.
        let (probe_tx, probe_rx) = broadcast::channel(1);
        let probe = self.balancer.spawn_health_probe(probe_rx);

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
                let _ = probe_tx.send(());
            })
            .await;

        if let Some(probe) = probe {
            if let Err(e) = probe.await {
                tracing::error!(error = %e, "Health probe task ended abnormally");
            }
        }

        served?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn balancer(&self) -> &Arc<LoadBalancer> {
        &self.balancer
    }
}

/// Forward anything that is not a status endpoint.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.balancer.dispatch(request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.balancer.health_report())
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.balancer.metrics_snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BalancerConfig;
    use crate::health::HealthReport;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut config = BalancerConfig::default();
        config.health_check.enabled = false;
        let balancer = Arc::new(LoadBalancer::new(&config).unwrap());
        HttpServer::new(balancer)
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_backends() {
        let server = server();
        let response = server
            .router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let report: HealthReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.alive, 2);
        assert_eq!(report.backends[0].url, "http://localhost:8081");
    }

    #[tokio::test]
    async fn test_no_live_backend_returns_503() {
        let server = server();
        for backend in server.balancer().registry().backends() {
            backend.set_alive(false);
        }

        let response = server
            .router
            .clone()
            .oneshot(Request::builder().uri("/anything").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"No healthy backends available");

        let snapshot = server.balancer().metrics_snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.failed_requests, 1);
    }
}
