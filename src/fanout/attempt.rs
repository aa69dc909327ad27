//! A single backend attempt and its classified result.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::Response;

use crate::fanout::error::AttemptError;
use crate::fanout::replicator::Replica;
use crate::fanout::transport::Transport;
use crate::observability::metrics;
use crate::registry::Backend;

/// Outcome of one backend attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Backend answered with a status in [200, 300).
    Success(Response<Body>),
    /// Backend answered with any other status.
    FailureStatus(Response<Body>),
    /// Construction, connection, protocol or timeout failure.
    TransportError(AttemptError),
}

impl AttemptOutcome {
    pub fn from_response(response: Response<Body>) -> Self {
        if response.status().is_success() {
            AttemptOutcome::Success(response)
        } else {
            AttemptOutcome::FailureStatus(response)
        }
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success(_) => "success",
            AttemptOutcome::FailureStatus(_) => "failure_status",
            AttemptOutcome::TransportError(e) if e.is_timeout() => "timeout",
            AttemptOutcome::TransportError(_) => "transport_error",
        }
    }
}

/// Result emitted by exactly one attempt task onto the completion channel.
#[derive(Debug)]
pub struct AttemptResult {
    pub backend: Backend,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

/// Run one attempt to completion. Never fails: every error is folded into the outcome.
pub async fn run_attempt<T: Transport>(
    transport: &T,
    replica: Replica,
    timeout: Duration,
) -> AttemptResult {
    let start = Instant::now();
    let Replica { backend, request } = replica;

    let outcome = match request {
        Ok(request) => match tokio::time::timeout(timeout, transport.send(request)).await {
            Ok(Ok(response)) => AttemptOutcome::from_response(response),
            Ok(Err(e)) => AttemptOutcome::TransportError(e),
            Err(_) => AttemptOutcome::TransportError(AttemptError::Timeout(timeout)),
        },
        Err(e) => AttemptOutcome::TransportError(e),
    };

    metrics::record_attempt(backend.base_url(), outcome.label(), start);

    AttemptResult {
        backend,
        outcome,
        elapsed: start.elapsed(),
    }
}
