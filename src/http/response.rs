//! Error → HTTP response mapping.
//!
//! # Design Decisions
//! - Per-backend failures never reach the client; only the aggregate does
//! - Total failure is a generic 502 with a fixed plain-text body
//! - Diagnostics go to the logs, not the response

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::fanout::FanoutError;

/// Body returned when no backend produced a 2xx.
pub const ALL_BACKENDS_FAILED: &str = "All backend requests failed";

impl FanoutError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FanoutError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            FanoutError::BodyRead(_) => StatusCode::BAD_REQUEST,
            FanoutError::AllBackendsFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for FanoutError {
    fn into_response(self) -> Response {
        let message = match &self {
            FanoutError::BodyTooLarge { .. } => "Request body too large",
            FanoutError::BodyRead(_) => "Failed to read request body",
            FanoutError::AllBackendsFailed(_) => ALL_BACKENDS_FAILED,
        };
        (self.status_code(), message).into_response()
    }
}
