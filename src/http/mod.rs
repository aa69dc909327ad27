//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign/propagate request ID)
//!     → admin handler (reserved update path) or proxy handler (everything else)
//!     → fan-out race
//!     → relayed winner, or response.rs (error → status mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
