//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (BackendRegistry: fixed backends + rotation cursor)
//!     → round_robin.rs (advance cursor, scan once for a live backend)
//!     → backend.rs (rewrite target URI for forwarding)
//!     → Return backend or None when every backend is dead
//! ```
//!
//! # Design Decisions
//! - Selector is stateless; the registry owns the cursor
//! - Liveness is per-backend and lock-free
//! - Dead backends are skipped, never removed

use std::fmt::Debug;
use std::sync::Arc;

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::Backend;
pub use pool::BackendRegistry;
pub use round_robin::RoundRobin;

/// Strategy for picking the backend that serves the next request.
pub trait PeerSelector: Send + Sync + Debug {
    /// Return the next live backend, or `None` if none is live.
    fn select_peer(&self, registry: &BackendRegistry) -> Option<Arc<Backend>>;
}
