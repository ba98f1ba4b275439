//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! collected so an operator sees the whole list at once. Individual backend
//! URLs are not checked here: malformed entries are skipped when the
//! registry is built.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::BalancerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),
    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
    #[error("no backends configured")]
    NoBackends,
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.interval_secs"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.timeout_secs"));
    }
    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeouts.read_secs"));
    }
    if config.timeouts.write_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeouts.write_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
