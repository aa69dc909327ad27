//! Fan-out HTTP proxy library.
//!
//! Every inbound request is replicated to all registered backends, the
//! backends are raced, and the first 2xx response is streamed back.

pub mod admin;
pub mod config;
pub mod fanout;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::BackendRegistry;
