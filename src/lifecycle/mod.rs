//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     CLI → load config → validate → logging → BACKEND_SERVERS → metrics → registry → bind → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server stops accepting → in-flight requests finish
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
