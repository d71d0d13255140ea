//! Instrumented hasher for measuring pruning

use super::{Blake3Hasher, ContentHasher};
use crate::model::Digest;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Wraps another hasher and counts how many digests it computes
///
/// Share it with an engine through an `Arc` and read [`calls`](Self::calls)
/// after an update:
///
/// ```
/// use std::sync::Arc;
/// use snapdiff::{CountingHasher, DiffEngine, EngineConfig};
///
/// let hasher = Arc::new(CountingHasher::default());
/// let mut engine = DiffEngine::new(EngineConfig::default()).with_hasher(hasher.clone());
/// engine.initialize(&serde_json::json!({"a": 1})).unwrap();
/// hasher.reset();
/// engine.update(&serde_json::json!({"a": 1})).unwrap();
/// assert_eq!(hasher.calls(), 1);
/// ```
pub struct CountingHasher {
    inner: Arc<dyn ContentHasher>,
    calls: AtomicU64,
}

impl CountingHasher {
    pub fn new(inner: Arc<dyn ContentHasher>) -> Self {
        CountingHasher {
            inner,
            calls: AtomicU64::new(0),
        }
    }

    /// Number of `hash` calls since creation or the last reset
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::Relaxed);
    }
}

impl Default for CountingHasher {
    fn default() -> Self {
        Self::new(Arc::new(Blake3Hasher))
    }
}

impl ContentHasher for CountingHasher {
    fn hash(&self, data: &[u8]) -> Digest {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.hash(data)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
