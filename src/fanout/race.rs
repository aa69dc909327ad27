//! Race coordination.
//!
//! # Responsibilities
//! - Launch one attempt task per replica
//! - Consume results in completion order through a shared channel
//! - Commit the first 2xx result as the winner
//! - Release every losing response body without blocking the winner
//!
//! # Design Decisions
//! - The channel is sized to the number of attempts, so no attempt ever
//!   waits on the coordinator to emit its result
//! - The channel closes when the last attempt drops its sender; that is the
//!   only "all finished" signal and it never gates consumption
//! - Losers are left running unless `cancel_losers` is set; their results
//!   are drained and discarded by a detached task

use std::fmt;
use std::time::Duration;

use axum::body::Body;
use axum::http::Response;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::config::FanoutConfig;
use crate::fanout::attempt::{run_attempt, AttemptOutcome, AttemptResult};
use crate::fanout::replicator::Replica;
use crate::fanout::transport::Transport;
use crate::registry::Backend;

/// Bounds on how much of a losing response is read before it is closed.
#[derive(Debug, Clone, Copy)]
pub struct DrainPolicy {
    pub limit_bytes: usize,
    pub timeout: Duration,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self {
            limit_bytes: 64 * 1024,
            timeout: Duration::from_secs(1),
        }
    }
}

/// The committed winner of a race.
#[derive(Debug)]
pub struct Winner {
    pub backend: Backend,
    pub response: Response<Body>,
    pub elapsed: Duration,
}

/// Tally of a race in which no backend produced a 2xx.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateFailure {
    pub attempted: usize,
    pub failure_statuses: usize,
    pub transport_errors: usize,
    pub timeouts: usize,
}

impl AggregateFailure {
    fn new(attempted: usize) -> Self {
        Self {
            attempted,
            ..Self::default()
        }
    }
}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempted, {} non-2xx, {} transport errors, {} timeouts",
            self.attempted, self.failure_statuses, self.transport_errors, self.timeouts
        )
    }
}

#[derive(Debug)]
pub enum RaceOutcome {
    Winner(Winner),
    AggregateFailure(AggregateFailure),
}

/// Runs replicated requests concurrently and picks the first successful response.
#[derive(Clone)]
pub struct RaceCoordinator<T> {
    transport: T,
    attempt_timeout: Duration,
    cancel_losers: bool,
    drain: DrainPolicy,
}

impl<T: Transport> RaceCoordinator<T> {
    pub fn new(transport: T, attempt_timeout: Duration) -> Self {
        Self {
            transport,
            attempt_timeout,
            cancel_losers: false,
            drain: DrainPolicy::default(),
        }
    }

    pub fn from_config(transport: T, config: &FanoutConfig) -> Self {
        Self::new(transport, config.attempt_timeout())
            .with_cancel_losers(config.cancel_losers)
            .with_drain_policy(DrainPolicy {
                limit_bytes: config.drain_limit_bytes,
                timeout: config.drain_timeout(),
            })
    }

    /// Abort still-running attempts as soon as a winner is committed.
    pub fn with_cancel_losers(mut self, cancel: bool) -> Self {
        self.cancel_losers = cancel;
        self
    }

    pub fn with_drain_policy(mut self, drain: DrainPolicy) -> Self {
        self.drain = drain;
        self
    }

    pub async fn race(&self, replicas: Vec<Replica>) -> RaceOutcome {
        let attempted = replicas.len();
        let (tx, mut rx) = mpsc::channel(attempted.max(1));

        let mut attempts = Vec::with_capacity(attempted);
        for replica in replicas {
            let tx = tx.clone();
            let transport = self.transport.clone();
            let timeout = self.attempt_timeout;
            let handle = tokio::spawn(
                async move {
                    let result = run_attempt(&transport, replica, timeout).await;
                    // If the receiver is gone the result is dropped here, closing its body.
                    let _ = tx.send(result).await;
                }
                .in_current_span(),
            );
            attempts.push(handle.abort_handle());
        }
        drop(tx);

        let mut failure = AggregateFailure::new(attempted);
        while let Some(result) = rx.recv().await {
            let AttemptResult {
                backend,
                outcome,
                elapsed,
            } = result;

            match outcome {
                AttemptOutcome::Success(response) => {
                    tracing::debug!(
                        backend = %backend,
                        status = %response.status(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Winner committed"
                    );
                    if self.cancel_losers {
                        for attempt in &attempts {
                            attempt.abort();
                        }
                    }
                    tokio::spawn(drain_remaining(rx, self.drain).in_current_span());
                    return RaceOutcome::Winner(Winner {
                        backend,
                        response,
                        elapsed,
                    });
                }
                AttemptOutcome::FailureStatus(response) => {
                    failure.failure_statuses += 1;
                    tracing::warn!(
                        backend = %backend,
                        status = %response.status(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Non-success status from backend"
                    );
                    tokio::spawn(discard(backend, response.into_body(), self.drain).in_current_span());
                }
                AttemptOutcome::TransportError(e) => {
                    if e.is_timeout() {
                        failure.timeouts += 1;
                    } else {
                        failure.transport_errors += 1;
                    }
                    tracing::warn!(backend = %backend, error = %e, "Error from backend");
                }
            }
        }

        RaceOutcome::AggregateFailure(failure)
    }
}

/// Consume every result that arrives after the winner and release it.
async fn drain_remaining(mut rx: mpsc::Receiver<AttemptResult>, drain: DrainPolicy) {
    while let Some(result) = rx.recv().await {
        match result.outcome {
            AttemptOutcome::Success(response) | AttemptOutcome::FailureStatus(response) => {
                tracing::debug!(
                    backend = %result.backend,
                    status = %response.status(),
                    "Discarding late response"
                );
                tokio::spawn(discard(result.backend, response.into_body(), drain).in_current_span());
            }
            AttemptOutcome::TransportError(e) => {
                tracing::debug!(backend = %result.backend, error = %e, "Late attempt failed");
            }
        }
    }
}

/// Read a losing body up to the drain bounds, then drop it.
async fn discard(backend: Backend, body: Body, drain: DrainPolicy) {
    let mut stream = body.into_data_stream();
    let mut drained = 0usize;

    let read = tokio::time::timeout(drain.timeout, async {
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    drained += bytes.len();
                    if drained >= drain.limit_bytes {
                        return false;
                    }
                }
                Err(_) => return false,
            }
        }
        true
    })
    .await;

    let complete = matches!(read, Ok(true));
    drop(stream);

    tracing::trace!(
        backend = %backend,
        drained_bytes = drained,
        complete,
        "Losing response released"
    );
}
