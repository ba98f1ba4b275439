//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Selected backend + inbound request
//!     → transport.rs (rewrite URI, strip hop-by-hop headers)
//!     → pooled hyper client, bounded by the read timeout
//!     → streamed response or TransportError
//! ```

pub mod transport;

pub use transport::{HttpTransport, Transport, TransportError};
