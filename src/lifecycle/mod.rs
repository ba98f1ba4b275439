//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Build LoadBalancer → Bind listener → Serve + probe
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop health probe → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Shutdown has a deadline: forced exit once it passes
//! - Only a configuration with zero usable backends is fatal at startup

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_termination;
