//! Backend set management.
//!
//! # Responsibilities
//! - Own the current backend set
//! - Hand out immutable snapshots to in-flight requests
//! - Replace the whole set atomically on administrative updates

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::registry::backend::{parse_backend_list, Backend};
use crate::registry::RegistryError;

/// Frozen view of the backend set taken at request start.
pub type BackendSnapshot = Arc<Vec<Backend>>;

/// Thread-safe, wholesale-replaceable set of backends.
#[derive(Debug)]
pub struct BackendRegistry {
    current: ArcSwap<Vec<Backend>>,
}

impl BackendRegistry {
    /// Create a registry. The initial set must not be empty.
    pub fn new(backends: Vec<Backend>) -> Result<Self, RegistryError> {
        if backends.is_empty() {
            return Err(RegistryError::InvalidInput);
        }
        metrics::record_backend_count(backends.len());
        Ok(Self {
            current: ArcSwap::from_pointee(backends),
        })
    }

    /// Create a registry from a comma-separated list.
    pub fn from_list(raw: &str) -> Result<Self, RegistryError> {
        Self::new(parse_backend_list(raw))
    }

    /// Current backend set. Readers never block writers and never see a partial swap.
    pub fn snapshot(&self) -> BackendSnapshot {
        self.current.load_full()
    }

    /// Replace the whole set from a comma-separated list.
    ///
    /// On `InvalidInput` the existing set is left untouched.
    pub fn replace(&self, raw: &str) -> Result<BackendSnapshot, RegistryError> {
        self.replace_backends(parse_backend_list(raw))
    }

    /// Replace the whole set with already-parsed backends.
    pub fn replace_backends(&self, backends: Vec<Backend>) -> Result<BackendSnapshot, RegistryError> {
        if backends.is_empty() {
            return Err(RegistryError::InvalidInput);
        }

        let new_set = Arc::new(backends);
        let previous = self.current.swap(Arc::clone(&new_set));

        tracing::info!(
            previous_count = previous.len(),
            backend_count = new_set.len(),
            backends = ?new_set.iter().map(Backend::base_url).collect::<Vec<_>>(),
            "Backend set replaced"
        );
        metrics::record_backend_count(new_set.len());

        Ok(new_set)
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(snapshot: &BackendSnapshot) -> Vec<String> {
        snapshot.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn empty_initial_set_is_rejected() {
        assert_eq!(BackendRegistry::new(Vec::new()).unwrap_err(), RegistryError::InvalidInput);
        assert!(BackendRegistry::from_list(" , ").is_err());
    }

    #[test]
    fn snapshot_is_frozen_across_replace() {
        let registry = BackendRegistry::from_list("http://a,http://b").unwrap();
        let before = registry.snapshot();

        registry.replace("http://c").unwrap();

        assert_eq!(urls(&before), ["http://a", "http://b"]);
        assert_eq!(urls(&registry.snapshot()), ["http://c"]);
    }

    #[test]
    fn invalid_replace_keeps_existing_set() {
        let registry = BackendRegistry::from_list("http://a").unwrap();

        assert_eq!(registry.replace("").unwrap_err(), RegistryError::InvalidInput);
        assert_eq!(registry.replace(" ,  ,").unwrap_err(), RegistryError::InvalidInput);

        assert_eq!(urls(&registry.snapshot()), ["http://a"]);
    }

    #[test]
    fn replace_is_idempotent() {
        let registry = BackendRegistry::from_list("http://a").unwrap();

        let first = registry.replace("http://x,http://y").unwrap();
        let second = registry.replace("http://x,http://y").unwrap();

        assert_eq!(first, second);
        assert_eq!(urls(&registry.snapshot()), ["http://x", "http://y"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    fn backend_gauge(rendered: &str) -> Option<f64> {
        rendered
            .lines()
            .find_map(|line| line.strip_prefix("fanout_backends "))
            .and_then(|value| value.trim().parse().ok())
    }

    #[test]
    fn backend_gauge_published_on_construction_and_replace() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let registry = ::metrics::with_local_recorder(&recorder, || {
            BackendRegistry::from_list("http://a,http://b,http://c").unwrap()
        });
        assert_eq!(backend_gauge(&handle.render()), Some(3.0));

        ::metrics::with_local_recorder(&recorder, || registry.replace("http://x").unwrap());
        assert_eq!(backend_gauge(&handle.render()), Some(1.0));
    }

    #[test]
    fn concurrent_readers_see_whole_sets() {
        let registry = Arc::new(BackendRegistry::from_list("http://a1,http://a2,http://a3").unwrap());

        let writer = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for i in 0..500 {
                    let list = if i % 2 == 0 {
                        "http://b1,http://b2"
                    } else {
                        "http://a1,http://a2,http://a3"
                    };
                    registry.replace(list).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let seen = urls(&registry.snapshot());
                        assert!(
                            seen == ["http://a1", "http://a2", "http://a3"]
                                || seen == ["http://b1", "http://b2"],
                            "observed partial set: {seen:?}"
                        );
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
