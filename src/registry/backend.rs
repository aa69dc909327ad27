//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream base address (scheme + host, no path)
//! - Parse comma-separated backend lists
//! - Build per-request target URIs

use std::fmt;
use std::sync::Arc;

/// A single backend base address.
///
/// Cheap to clone; snapshots and attempt tasks each hold their own handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Backend {
    base_url: Arc<str>,
}

impl Backend {
    /// Create a backend from a raw address, trimming whitespace and a trailing `/`.
    ///
    /// Returns `None` for blank entries. The address itself is not validated here:
    /// a malformed address surfaces later as that backend's construction error.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            base_url: Arc::from(trimmed),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute target for `path_and_query` on this backend.
    pub fn target(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

/// Split a comma-separated backend list, dropping blank entries.
pub fn parse_backend_list(raw: &str) -> Vec<Backend> {
    raw.split(',').filter_map(Backend::parse).collect()
}
