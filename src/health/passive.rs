//! Passive health checking (failure detection).
//!
//! A failed delivery demotes the backend immediately instead of waiting for
//! the next active pass. Only the active probe brings it back.

use crate::load_balancer::Backend;
use crate::net::TransportError;
use crate::observability::metrics::record_backend_health;

/// Mark `backend` dead after a transport-level failure.
pub fn report_transport_failure(backend: &Backend, error: &TransportError) {
    if backend.set_alive(false) {
        tracing::warn!(
            backend = %backend.address(),
            error = %error,
            "Upstream delivery failed, marking backend down"
        );
    } else {
        tracing::debug!(
            backend = %backend.address(),
            error = %error,
            "Upstream delivery failed on a backend already marked down"
        );
    }
    record_backend_health(backend.address(), false);
}
