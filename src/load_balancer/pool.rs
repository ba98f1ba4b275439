//! Backend registry.
//!
//! # Responsibilities
//! - Own the ordered, fixed set of backends
//! - Hand out rotation indices for round-robin selection
//! - Expose per-backend liveness reads and writes

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::LoadBalancerError;
use crate::load_balancer::backend::Backend;

/// Ordered backends plus the rotation cursor.
///
/// Membership never changes after construction, so `len()` is stable and
/// every index returned by [`advance_cursor`](Self::advance_cursor) is in
/// range.
#[derive(Debug)]
pub struct BackendRegistry {
    backends: Vec<Arc<Backend>>,
    cursor: AtomicUsize,
}

impl BackendRegistry {
    /// Create a registry from already-parsed backends.
    pub fn new(backends: Vec<Backend>) -> Result<Self, LoadBalancerError> {
        if backends.is_empty() {
            return Err(LoadBalancerError::NoBackends);
        }
        Ok(Self {
            backends: backends.into_iter().map(Arc::new).collect(),
            cursor: AtomicUsize::new(0),
        })
    }

    /// Build a registry from configured target strings.
    ///
    /// Malformed entries are logged and skipped; the registry fails only if
    /// nothing usable remains.
    pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Result<Self, LoadBalancerError> {
        let mut backends = Vec::with_capacity(addresses.len());
        for address in addresses {
            match Backend::parse(address.as_ref()) {
                Ok(backend) => {
                    tracing::info!(backend = %backend.address(), "Configured backend");
                    backends.push(backend);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping backend");
                }
            }
        }
        Self::new(backends)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false: an empty registry cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Backend>> {
        self.backends.get(index)
    }

    /// Atomically advance the cursor and return the new position modulo the
    /// backend count.
    pub fn advance_cursor(&self) -> usize {
        // A single RMW on one location is linearizable at any ordering.
        // Wrapping past usize::MAX skews the rotation once unless N divides 2^64.
        let next = self.cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        next % self.backends.len()
    }

    /// Liveness of backend `index`; out-of-range indices read as dead.
    pub fn is_alive(&self, index: usize) -> bool {
        self.backends.get(index).is_some_and(|b| b.is_alive())
    }

    /// Set liveness of backend `index`, returning the previous value.
    pub fn set_alive(&self, index: usize, alive: bool) -> Option<bool> {
        self.backends.get(index).map(|b| b.set_alive(alive))
    }

    pub fn alive_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_alive()).count()
    }
}
