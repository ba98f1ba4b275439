//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → TCP connect to each backend, bounded per probe
//!     → Write liveness into the registry
//!
//! Passive health checks (passive.rs):
//!     Transport failure observed by the dispatcher
//!     → Mark that backend dead immediately
//!
//! Reporting (state.rs):
//!     Registry → HealthReport → /health
//! ```
//!
//! # Design Decisions
//! - Dead backends keep being probed so they can recover
//! - A single probe result flips liveness; no thresholds
//! - Health state is per-backend, not per-pool

pub mod active;
pub mod passive;
pub mod state;

pub use active::{HealthProbe, ProbeError};
pub use state::{BackendHealth, HealthReport};
