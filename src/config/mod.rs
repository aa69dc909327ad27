//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! BACKEND_SERVERS (environment)
//!     → loader.rs (split on commas, fail fast if empty)
//!     → initial BackendRegistry contents
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the backend set changes at runtime
//! - All fields have defaults so the proxy runs without a file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{backends_from_env, load_config, ConfigError, BACKENDS_ENV};
pub use schema::{AdminConfig, FanoutConfig, ListenerConfig, ObservabilityConfig, ProxyConfig};
