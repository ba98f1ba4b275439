//! Request identification.
//!
//! # Responsibilities
//! - Attach a unique `x-request-id` to every inbound request
//! - Keep an ID supplied by the client or an upstream proxy
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The header travels with the request to the backend

use axum::http::{HeaderName, HeaderValue, Request};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// A generated request identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the request ID off a request.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Layer that inserts `x-request-id` when it is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(&X_REQUEST_ID) {
            let id = RequestId::new();
            if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    async fn echo_id(request: Request<()>) -> Result<String, Infallible> {
        Ok(request.request_id().to_string())
    }

    #[tokio::test]
    async fn test_missing_id_is_generated() {
        let service = RequestIdLayer.layer(service_fn(echo_id));
        let id = service.oneshot(Request::new(())).await.unwrap();
        assert!(Uuid::parse_str(&id).is_ok(), "not a uuid: {}", id);
    }

    #[tokio::test]
    async fn test_existing_id_is_kept() {
        let service = RequestIdLayer.layer(service_fn(echo_id));
        let request = Request::builder()
            .header("x-request-id", "abc-123")
            .body(())
            .unwrap();
        assert_eq!(service.oneshot(request).await.unwrap(), "abc-123");
    }

    #[test]
    fn test_request_without_header_reads_unknown() {
        assert_eq!(Request::new(()).request_id(), "unknown");
    }
}
