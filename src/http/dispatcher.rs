//! Request dispatch.
//!
//! # Responsibilities
//! - Select a live backend for each inbound request
//! - Forward through the transport and hand back the response
//! - Demote a backend as soon as delivery to it fails
//! - Record exactly one outcome per request
//!
//! # Design Decisions
//! - No retry: a failed delivery surfaces as 502 to the caller
//! - Any response from the backend, 5xx included, is passed through
//! - A dispatch dropped before it finishes still counts as one failure

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Instant;

use crate::error::DispatchError;
use crate::health::passive::report_transport_failure;
use crate::http::request::RequestIdExt;
use crate::load_balancer::{BackendRegistry, PeerSelector};
use crate::net::Transport;
use crate::observability::metrics::{record_request, MetricsCollector};

/// Ties peer selection to the transport, liveness and metrics.
pub struct RequestDispatcher {
    registry: Arc<BackendRegistry>,
    selector: Arc<dyn PeerSelector>,
    transport: Arc<dyn Transport>,
    metrics: Arc<MetricsCollector>,
}

impl RequestDispatcher {
    pub fn new(
        registry: Arc<BackendRegistry>,
        selector: Arc<dyn PeerSelector>,
        transport: Arc<dyn Transport>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            registry,
            selector,
            transport,
            metrics,
        }
    }

    pub async fn dispatch(&self, request: Request<Body>) -> Result<Response<Body>, DispatchError> {
        let start = Instant::now();
        let request_id = request.request_id().to_string();
        let method = request.method().to_string();
        let outcome = PendingOutcome::new(&self.metrics, &request_id);

        let Some(peer) = self.selector.select_peer(&self.registry) else {
            tracing::warn!(request_id = %request_id, path = %request.uri().path(), "No healthy backends available");
            outcome.finish(false);
            record_request(&method, StatusCode::SERVICE_UNAVAILABLE.as_u16(), "none", start);
            return Err(DispatchError::NoPeerAvailable);
        };

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %request.uri().path(),
            backend = %peer.address(),
            "Routing request"
        );

        match self.transport.forward(&peer, request).await {
            Ok(response) => {
                let status = response.status();
                outcome.finish(is_success(status));
                record_request(&method, status.as_u16(), peer.address(), start);
                Ok(response)
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    backend = %peer.address(),
                    error = %e,
                    "Upstream error"
                );
                report_transport_failure(&peer, &e);
                outcome.finish(false);
                record_request(&method, StatusCode::BAD_GATEWAY.as_u16(), peer.address(), start);
                Err(DispatchError::Transport {
                    backend: peer.address().to_string(),
                    source: e,
                })
            }
        }
    }
}

/// Records exactly one outcome: the one passed to `finish`, or a failure
/// if the dispatch future is dropped first.
struct PendingOutcome<'a> {
    metrics: &'a MetricsCollector,
    request_id: &'a str,
    recorded: bool,
}

impl<'a> PendingOutcome<'a> {
    fn new(metrics: &'a MetricsCollector, request_id: &'a str) -> Self {
        Self {
            metrics,
            request_id,
            recorded: false,
        }
    }

    fn finish(mut self, success: bool) {
        self.recorded = true;
        self.metrics.record_outcome(success);
    }
}

impl Drop for PendingOutcome<'_> {
    fn drop(&mut self) {
        if !self.recorded {
            tracing::debug!(request_id = %self.request_id, "Dispatch cancelled before completion");
            self.metrics.record_outcome(false);
        }
    }
}

/// 1xx-3xx count as success; 4xx and 5xx as failure.
fn is_success(status: StatusCode) -> bool {
    !(status.is_client_error() || status.is_server_error())
}
