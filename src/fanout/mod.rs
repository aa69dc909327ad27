//! Fan-out subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request + BackendSnapshot
//!     → replicator.rs (buffer body once, one outbound request per backend)
//!     → race.rs (spawn one attempt per backend, consume completions in arrival order)
//!         → attempt.rs (send with per-attempt timeout, classify outcome)
//!         → transport.rs (hyper-util client)
//!     → first 2xx wins → relay.rs (stream status/headers/body to caller)
//!     → no 2xx → AggregateFailure → 502
//!
//! Losers:
//!     arrived before winner → discarded on detached tasks
//!     arrived after winner  → background drain task discards them
//! ```
//!
//! # Design Decisions
//! - Completion order decides the winner, never backend position
//! - Per-backend failures never reach the caller individually
//! - Loser bodies are drained (bounded) and closed, never relayed
//! - Losers are not cancelled unless `cancel_losers` is enabled

pub mod attempt;
pub mod error;
pub mod race;
pub mod relay;
pub mod replicator;
pub mod transport;

pub use attempt::{AttemptOutcome, AttemptResult};
pub use error::{AttemptError, FanoutError};
pub use race::{AggregateFailure, DrainPolicy, RaceCoordinator, RaceOutcome, Winner};
pub use relay::relay;
pub use replicator::{buffer_body, replicate, Replica};
pub use transport::{HyperTransport, Transport};
