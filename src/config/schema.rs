//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for (de)serialization from TOML files, and
//! every section has defaults so a partial file is enough.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BalancerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Ordered backend targets (e.g. "http://10.0.0.5:3000").
    pub backends: Vec<String>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backends: vec![
                "http://localhost:8081".to_string(),
                "http://localhost:8082".to_string(),
            ],
            health_check: HealthCheckConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the background probe loop.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Per-probe connect timeout in seconds.
    pub timeout_secs: u64,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
            timeout_secs: 3,
        }
    }
}

/// Timeout configuration for the listener and upstream exchanges.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on a single upstream exchange in seconds.
    pub read_secs: u64,

    /// Upper bound on handling one inbound request in seconds; also caps
    /// the upstream exchange (see [`TimeoutConfig::upstream`]).
    pub write_secs: u64,

    /// Idle pooled upstream connection timeout in seconds.
    pub idle_secs: u64,
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }

    /// Deadline for one proxied exchange: the tighter of read and write.
    pub fn upstream(&self) -> Duration {
        self.read().min(self.write())
    }

    /// Deadline for draining in-flight requests on shutdown.
    pub fn shutdown_deadline(&self) -> Duration {
        self.write() * 10
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 15,
            write_secs: 15,
            idle_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Prometheus exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: BalancerConfig = toml::from_str(
            r#"
            backends = ["http://10.0.0.1:3000"]

            [health_check]
            interval_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.backends, vec!["http://10.0.0.1:3000".to_string()]);
        assert_eq!(config.health_check.interval_secs, 2);
        assert_eq!(config.health_check.timeout_secs, 3);
        assert!(config.health_check.enabled);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts, TimeoutConfig::default());
    }

    #[test]
    fn test_shutdown_deadline_scales_write_timeout() {
        let timeouts = TimeoutConfig {
            write_secs: 3,
            ..Default::default()
        };
        assert_eq!(timeouts.shutdown_deadline(), Duration::from_secs(30));
    }

    #[test]
    fn test_upstream_deadline_is_tighter_of_read_and_write() {
        let timeouts = TimeoutConfig {
            read_secs: 5,
            write_secs: 2,
            ..Default::default()
        };
        assert_eq!(timeouts.upstream(), Duration::from_secs(2));

        let timeouts = TimeoutConfig {
            read_secs: 1,
            write_secs: 4,
            ..Default::default()
        };
        assert_eq!(timeouts.upstream(), Duration::from_secs(1));
    }
}
