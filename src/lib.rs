//! Round-robin HTTP load balancer library.

pub mod balancer;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;

pub use balancer::LoadBalancer;
pub use config::BalancerConfig;
pub use error::{DispatchError, LoadBalancerError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
