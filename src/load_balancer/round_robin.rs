//! Round-robin load balancing strategy.

use std::sync::Arc;

use crate::load_balancer::{backend::Backend, pool::BackendRegistry, PeerSelector};

/// Round-robin selector.
/// Rotates through the registry's backends, skipping dead ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl PeerSelector for RoundRobin {
    fn select_peer(&self, registry: &BackendRegistry) -> Option<Arc<Backend>> {
        let start = registry.advance_cursor();
        first_live(start, registry.len(), |index| registry.is_alive(index))
            .and_then(|index| registry.get(index).cloned())
    }
}

/// First index from `start`, wrapping, for which `is_alive` holds. Each of
/// the `len` slots is checked at most once so an all-dead pool terminates.
fn first_live(start: usize, len: usize, mut is_alive: impl FnMut(usize) -> bool) -> Option<usize> {
    (0..len)
        .map(|offset| (start + offset) % len)
        .find(|&index| is_alive(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(n: usize) -> BackendRegistry {
        let addresses: Vec<String> = (0..n).map(|i| format!("http://127.0.0.1:{}", 8080 + i)).collect();
        BackendRegistry::from_addresses(addresses.as_slice()).unwrap()
    }

    fn pick(lb: &RoundRobin, registry: &BackendRegistry) -> Option<String> {
        lb.select_peer(registry).map(|b| b.address().to_string())
    }

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();
        let registry = registry(2);

        let s1 = pick(&lb, &registry).unwrap();
        assert_eq!(s1, "http://127.0.0.1:8081");

        let s2 = pick(&lb, &registry).unwrap();
        assert_eq!(s2, "http://127.0.0.1:8080");

        let s3 = pick(&lb, &registry).unwrap();
        assert_eq!(s3, "http://127.0.0.1:8081");
    }

    #[test]
    fn test_full_rotation_visits_each_backend_once() {
        let lb = RoundRobin::new();
        for n in 1..=6 {
            let registry = registry(n);
            let mut seen: Vec<String> = (0..n).map(|_| pick(&lb, &registry).unwrap()).collect();
            let first = seen[0].clone();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), n, "rotation over {} backends repeated a peer", n);
            assert_eq!(first, registry.backends()[1 % n].address());
        }
    }

    #[test]
    fn test_single_live_backend_always_chosen() {
        let lb = RoundRobin::new();
        let registry = registry(3);
        registry.set_alive(0, false);
        registry.set_alive(2, false);

        for _ in 0..10 {
            assert_eq!(pick(&lb, &registry).unwrap(), "http://127.0.0.1:8081");
        }
    }

    #[test]
    fn test_all_dead_returns_none_and_advances_once() {
        let lb = RoundRobin::new();
        let registry = registry(4);
        for i in 0..4 {
            registry.set_alive(i, false);
        }

        assert!(lb.select_peer(&registry).is_none());
        assert!(lb.select_peer(&registry).is_none());
        // Two calls, two cursor advancements.
        assert_eq!(registry.advance_cursor(), 3);
    }

    #[test]
    fn test_scan_reads_each_backend_at_most_once() {
        for len in 1..=5 {
            for start in 0..len {
                let mut reads = vec![0; len];
                let found = first_live(start, len, |index| {
                    reads[index] += 1;
                    false
                });
                assert_eq!(found, None);
                assert_eq!(reads, vec![1; len], "len={} start={}", len, start);
            }
        }

        // Stops at the first live slot after wrapping.
        let mut checked = Vec::new();
        let found = first_live(3, 4, |index| {
            checked.push(index);
            index == 1
        });
        assert_eq!(found, Some(1));
        assert_eq!(checked, vec![3, 0, 1]);
    }

    #[test]
    fn test_revived_backend_rejoins_rotation() {
        let lb = RoundRobin::new();
        let registry = registry(2);
        registry.set_alive(1, false);
        assert_eq!(pick(&lb, &registry).unwrap(), "http://127.0.0.1:8080");

        registry.set_alive(1, true);
        let picks: Vec<String> = (0..2).map(|_| pick(&lb, &registry).unwrap()).collect();
        assert!(picks.contains(&"http://127.0.0.1:8081".to_string()));
    }
}
