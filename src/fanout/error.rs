//! Fan-out error types.

use std::time::Duration;

use axum::BoxError;
use thiserror::Error;

use crate::fanout::race::AggregateFailure;

/// Failure of a single backend attempt. Never surfaced to the caller on its own.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The outbound request could not be built for this backend.
    #[error("failed to construct request: {0}")]
    Construction(#[from] axum::http::Error),

    /// Connect, write, read or protocol failure.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// No response head within the per-attempt timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl AttemptError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::Timeout(_))
    }
}

/// Errors that end a proxied request. Mapped to HTTP responses in `http::response`.
#[derive(Debug, Error)]
pub enum FanoutError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    BodyRead(#[source] BoxError),

    #[error("all backend requests failed ({0})")]
    AllBackendsFailed(AggregateFailure),
}
