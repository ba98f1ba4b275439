//! Upstream transport.
//!
//! # Responsibilities
//! - Forward a request to a chosen backend
//! - Stream the backend's response back without buffering
//! - Bound each upstream exchange with a timeout
//!
//! # Design Decisions
//! - The transport never touches liveness; the dispatcher reacts to errors
//! - Hop-by-hop headers are stripped in both directions

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request, Response, Version};
use futures_util::future::BoxFuture;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use thiserror::Error;
use tokio::time;

use crate::load_balancer::Backend;

/// Failure to deliver a request to a backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid upstream target: {0}")]
    InvalidTarget(#[from] axum::http::Error),
    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),
}

/// Forwards a request to a backend and hands back its response.
pub trait Transport: Send + Sync + 'static {
    fn forward<'a>(
        &'a self,
        backend: &'a Backend,
        request: Request<Body>,
    ) -> BoxFuture<'a, Result<Response<Body>, TransportError>>;
}

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
];

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

/// HTTP/1.1 transport backed by the hyper-util pooled client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl HttpTransport {
    /// `timeout` bounds connect plus the wait for response headers;
    /// `idle_timeout` bounds how long pooled connections are kept.
    pub fn new(timeout: Duration, idle_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeout));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(idle_timeout)
            .build(connector);

        Self { client, timeout }
    }
}

impl Transport for HttpTransport {
    fn forward<'a>(
        &'a self,
        backend: &'a Backend,
        request: Request<Body>,
    ) -> BoxFuture<'a, Result<Response<Body>, TransportError>> {
        Box::pin(async move {
            let (mut parts, body) = request.into_parts();
            parts.uri = backend.target_uri(&parts.uri)?;
            parts.version = Version::HTTP_11;
            strip_hop_by_hop(&mut parts.headers);

            let upstream = Request::from_parts(parts, body);
            let response: Response<Incoming> = time::timeout(self.timeout, self.client.request(upstream))
                .await
                .map_err(|_| TransportError::Timeout(self.timeout))??;

            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Ok(Response::from_parts(parts, Body::new(body)))
        })
    }
}
