//! Backend health snapshot served on `/health`.

use serde::{Deserialize, Serialize};

use crate::load_balancer::BackendRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub url: String,
    pub alive: bool,
}

/// Liveness of every backend, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub total: usize,
    pub alive: usize,
    pub dead: usize,
    pub backends: Vec<BackendHealth>,
}

impl HealthReport {
    /// Each flag is read once, so the counts always agree with the list.
    pub fn from_registry(registry: &BackendRegistry) -> Self {
        let backends: Vec<BackendHealth> = registry
            .backends()
            .iter()
            .map(|b| BackendHealth {
                url: b.address().to_string(),
                alive: b.is_alive(),
            })
            .collect();

        let total = backends.len();
        let alive = backends.iter().filter(|b| b.alive).count();

        Self {
            total,
            alive,
            dead: total - alive,
            backends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_and_shape() {
        let registry = BackendRegistry::from_addresses(&[
            "http://localhost:8081",
            "http://localhost:8082",
            "http://localhost:8083",
        ])
        .unwrap();
        registry.set_alive(1, false);

        let report = HealthReport::from_registry(&registry);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "total": 3,
                "alive": 2,
                "dead": 1,
                "backends": [
                    { "url": "http://localhost:8081", "alive": true },
                    { "url": "http://localhost:8082", "alive": false },
                    { "url": "http://localhost:8083", "alive": true },
                ],
            })
        );
    }
}
