//! Model-handle cache with lazy, idempotent resolution.
//!
//! Resolving the same model identifier twice yields the same shared handle.
//! Failed resolutions are never cached, so a missing credential or a typo'd
//! identifier can be corrected and retried without restarting the process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::SharedBackend;
use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Backend Factory
// ─────────────────────────────────────────────────────────────────────────────

/// Creates a backend for a model identifier.
///
/// The cache calls this exactly once per identifier that resolves
/// successfully. Implementations validate the identifier and gather
/// whatever configuration the provider needs.
pub trait BackendFactory: Send + Sync {
    /// Validate `model` and build a backend for it.
    fn create(&self, model: &str) -> Result<SharedBackend>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Model Handle
// ─────────────────────────────────────────────────────────────────────────────

/// A resolved model: the identifier plus the backend that serves it.
pub struct ModelHandle {
    /// The model identifier this handle was resolved for.
    pub identifier: String,

    /// The backend serving completions for this model.
    pub backend: SharedBackend,
}

impl ModelHandle {
    /// Create a handle pairing an identifier with a backend.
    pub fn new(identifier: impl Into<String>, backend: SharedBackend) -> Self {
        Self {
            identifier: identifier.into(),
            backend,
        }
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("identifier", &self.identifier)
            .field("backend", &self.backend.name())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Model Cache
// ─────────────────────────────────────────────────────────────────────────────

/// Cache of resolved model handles, keyed by identifier.
///
/// Concurrent resolutions of the same identifier may both invoke the
/// factory, but only one handle wins and is kept; all callers converge on
/// it.
pub struct ModelCache {
    factory: Arc<dyn BackendFactory>,
    handles: RwLock<HashMap<String, Arc<ModelHandle>>>,
}

impl ModelCache {
    /// Create a cache that resolves identifiers through `factory`.
    pub fn new(factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            factory,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a model identifier to its shared handle.
    ///
    /// Returns the cached handle when one exists; otherwise invokes the
    /// factory and caches the result. Factory errors propagate to the
    /// caller and leave the cache unchanged.
    pub async fn resolve(&self, model: &str) -> Result<Arc<ModelHandle>> {
        {
            let handles = self.handles.read().await;
            if let Some(handle) = handles.get(model) {
                return Ok(Arc::clone(handle));
            }
        }

        // Construct outside the write lock; errors must not poison the map.
        let backend = self.factory.create(model)?;
        let handle = Arc::new(ModelHandle::new(model, backend));

        tracing::info!(model = %model, "Initialized model backend");

        let mut handles = self.handles.write().await;
        // A racing resolver may have inserted first; keep whichever won.
        let entry = handles
            .entry(model.to_string())
            .or_insert_with(|| Arc::clone(&handle));
        Ok(Arc::clone(entry))
    }

    /// Whether a handle is cached for `model`.
    pub async fn contains(&self, model: &str) -> bool {
        self.handles.read().await.contains_key(model)
    }

    /// Number of cached handles.
    pub async fn len(&self) -> usize {
        self.handles.read().await.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.handles.read().await.is_empty()
    }
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::error::LlmError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Factory that counts invocations and can be told to fail.
    struct CountingFactory {
        calls: AtomicU32,
        fail: std::sync::atomic::AtomicBool,
    }

    impl CountingFactory {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: std::sync::atomic::AtomicBool::new(false),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl BackendFactory for CountingFactory {
        fn create(&self, model: &str) -> Result<SharedBackend> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(LlmError::Config("credential unavailable".into()));
            }
            let _ = model;
            Ok(Arc::new(MockBackend::with_text("ok")))
        }
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let factory = Arc::new(CountingFactory::new());
        let cache = ModelCache::new(factory.clone());

        let first = cache.resolve("gpt-4").await.unwrap();
        let second = cache.resolve("gpt-4").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.calls(), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_models_get_distinct_handles() {
        let factory = Arc::new(CountingFactory::new());
        let cache = ModelCache::new(factory.clone());

        let a = cache.resolve("gpt-3.5-turbo").await.unwrap();
        let b = cache.resolve("gpt-4").await.unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.identifier, "gpt-3.5-turbo");
        assert_eq!(b.identifier, "gpt-4");
        assert_eq!(factory.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let factory = Arc::new(CountingFactory::new());
        let cache = ModelCache::new(factory.clone());

        factory.fail.store(true, Ordering::SeqCst);
        assert!(cache.resolve("gpt-4").await.is_err());
        assert!(cache.is_empty().await);

        // The fault is corrected; the same identifier now resolves.
        factory.fail.store(false, Ordering::SeqCst);
        let handle = cache.resolve("gpt-4").await.unwrap();
        assert_eq!(handle.identifier, "gpt-4");
        assert_eq!(factory.calls(), 2);
        assert!(cache.contains("gpt-4").await);
    }
}
