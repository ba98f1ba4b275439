//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, /health and /metrics, proxy fallback)
//!     → request.rs (attach x-request-id)
//!     → dispatcher.rs (select backend, forward, demote on failure)
//!     → response.rs (503 / 502 for dispatch failures)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::RequestDispatcher;
pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
