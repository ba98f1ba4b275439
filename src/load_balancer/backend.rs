//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track liveness (written by health checks and failed dispatches)
//! - Rewrite inbound request URIs onto the backend's authority

use axum::http::uri::{Authority, PathAndQuery, Scheme, Uri};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

use crate::error::LoadBalancerError;

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// The address as configured, used for reporting.
    address: String,
    /// Parsed form of `address`.
    url: Url,
    /// Pre-computed authority for request forwarding.
    authority: Authority,
    /// Liveness flag. Starts true until a probe says otherwise.
    alive: AtomicBool,
}

impl Backend {
    /// Parse a configured target such as `http://10.0.0.5:3000`.
    ///
    /// Only plain `http` targets with a host are accepted.
    pub fn parse(address: &str) -> Result<Self, LoadBalancerError> {
        let address = address.trim();
        let invalid = |reason: String| LoadBalancerError::InvalidBackend {
            address: address.to_string(),
            reason,
        };

        let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port".to_string()))?;

        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };
        let authority = Authority::from_str(&format!("{}:{}", host, port))
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            address: address.to_string(),
            url,
            authority,
            alive: AtomicBool::new(true),
        })
    }

    /// The address as it appeared in configuration.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `host:port` used for reachability probes.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Set liveness, returning the previous value.
    pub fn set_alive(&self, alive: bool) -> bool {
        self.alive.swap(alive, Ordering::AcqRel)
    }

    /// Rewrite an inbound URI so it targets this backend.
    ///
    /// Path and query are carried over; a base path configured on the
    /// backend URL is prepended.
    pub fn target_uri(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        let incoming = inbound
            .path_and_query()
            .map(PathAndQuery::as_str)
            .unwrap_or("/");

        let base = self.url.path().trim_end_matches('/');
        let path_and_query = if base.is_empty() {
            PathAndQuery::from_str(incoming)?
        } else {
            PathAndQuery::from_str(&format!("{}{}", base, incoming))?
        };

        Ok(Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_configured_address() {
        let backend = Backend::parse(" http://localhost:8081 ").unwrap();
        assert_eq!(backend.address(), "http://localhost:8081");
        assert_eq!(backend.authority().as_str(), "localhost:8081");
        assert!(backend.is_alive());
    }

    #[test]
    fn test_parse_defaults_port() {
        let backend = Backend::parse("http://example.internal").unwrap();
        assert_eq!(backend.authority().as_str(), "example.internal:80");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Backend::parse("not a url").is_err());
        assert!(Backend::parse("https://secure.internal").is_err());
        assert!(Backend::parse("unix:/tmp/socket").is_err());
    }

    #[test]
    fn test_set_alive_returns_previous() {
        let backend = Backend::parse("http://127.0.0.1:9000").unwrap();
        assert!(backend.set_alive(false));
        assert!(!backend.is_alive());
        assert!(!backend.set_alive(true));
        assert!(backend.is_alive());
    }

    #[test]
    fn test_target_uri_rewrites_authority() {
        let backend = Backend::parse("http://127.0.0.1:9000").unwrap();
        let inbound: Uri = "/api/items?page=2".parse().unwrap();
        let target = backend.target_uri(&inbound).unwrap();
        assert_eq!(target.to_string(), "http://127.0.0.1:9000/api/items?page=2");
    }

    #[test]
    fn test_target_uri_prepends_base_path() {
        let backend = Backend::parse("http://127.0.0.1:9000/v1/").unwrap();
        let inbound: Uri = "/users".parse().unwrap();
        let target = backend.target_uri(&inbound).unwrap();
        assert_eq!(target.to_string(), "http://127.0.0.1:9000/v1/users");
    }

    #[test]
    fn test_concurrent_flips_never_tear() {
        let backend = std::sync::Arc::new(Backend::parse("http://127.0.0.1:9000").unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let backend = backend.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        backend.set_alive(i % 2 == 0);
                        let _ = backend.is_alive();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
