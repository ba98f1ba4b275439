//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, health probe, lifecycle produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (dispatch counters, Prometheus facade)
//!
//! Consumers:
//!     → stdout log stream
//!     → /metrics JSON endpoint (MetricsCollector snapshot)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;

pub use metrics::{MetricsCollector, MetricsSnapshot};
