//! Error responses.
//!
//! Maps dispatch failures to plain-text HTTP responses:
//! - no live backend → 503 Service Unavailable
//! - delivery failure → 502 Bad Gateway

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::DispatchError;

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NoPeerAvailable => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Transport { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = match self {
            DispatchError::NoPeerAvailable => "No healthy backends available",
            DispatchError::Transport { .. } => "Bad gateway: upstream request failed",
        };
        (self.status(), body).into_response()
    }
}
