//! Error types shared across subsystems.

use thiserror::Error;

use crate::net::transport::TransportError;

/// Fatal startup errors for the load balancer.
#[derive(Debug, Error)]
pub enum LoadBalancerError {
    /// No usable backend survived configuration parsing.
    #[error("no valid backends configured")]
    NoBackends,
    /// A backend target could not be used.
    #[error("invalid backend address '{address}': {reason}")]
    InvalidBackend { address: String, reason: String },
}

/// Per-request dispatch failures, mapped to HTTP responses in `http::response`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Every backend is currently marked dead.
    #[error("no healthy backends available")]
    NoPeerAvailable,
    /// The chosen backend could not be reached or dropped the exchange.
    #[error("upstream {backend} failed: {source}")]
    Transport {
        backend: String,
        #[source]
        source: TransportError,
    },
}
