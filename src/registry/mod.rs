//! Backend registry subsystem.
//!
//! # Data Flow
//! ```text
//! BACKEND_SERVERS / admin update
//!     → backend.rs (split comma list, normalize base addresses)
//!     → pool.rs (atomic swap of the whole set)
//!
//! Proxy request:
//!     pool.rs snapshot()
//!     → frozen Arc<Vec<Backend>> handed to the fan-out
//! ```
//!
//! # Design Decisions
//! - The registry is the only shared mutable state in the proxy
//! - Writers swap a complete set; readers never observe a partial update
//! - Snapshots are reference-counted and immutable, so no lock is held
//!   across network I/O

pub mod backend;
pub mod pool;

use thiserror::Error;

pub use backend::{parse_backend_list, Backend};
pub use pool::{BackendRegistry, BackendSnapshot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The update contained no usable backend address.
    #[error("no backends provided")]
    InvalidInput,
}
