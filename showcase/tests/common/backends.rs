//! Stand-ins for the shared remote tier.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use showcase_backend::{Backend, BackendError, BackendResult};
use showcase_core::{BackendLabel, CacheValue, Clock, Raw, SharedClock, ShowcaseKey};

/// In-memory remote tier keyed by the rendered key string.
///
/// Clones share storage and counters.
#[derive(Clone)]
pub struct SharedBackend {
    store: Arc<DashMap<String, CacheValue<Raw>>>,
    clock: SharedClock,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl SharedBackend {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            clock,
            reads: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn get_raw(&self, key: &str) -> Option<CacheValue<Raw>> {
        self.store.get(key).map(|v| v.clone())
    }

    pub fn put_raw(&self, key: &str, value: CacheValue<Raw>) {
        self.store.insert(key.to_owned(), value);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for SharedBackend {
    async fn read(&self, key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let now = self.clock.now();
        Ok(self
            .store
            .get(&key.to_string())
            .filter(|v| !v.is_expired_at(now))
            .map(|v| v.clone()))
    }

    async fn write(&self, key: &ShowcaseKey, value: CacheValue<Raw>) -> BackendResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("shared")
    }
}

/// Remote tier whose every call fails like a timed-out request.
#[derive(Clone, Default)]
pub struct FailingBackend {
    calls: Arc<AtomicUsize>,
}

impl FailingBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> BackendError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        BackendError::ConnectionError(Box::new(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "simulated timeout",
        )))
    }
}

#[async_trait]
impl Backend for FailingBackend {
    async fn read(&self, _key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>> {
        Err(self.fail())
    }

    async fn write(&self, _key: &ShowcaseKey, _value: CacheValue<Raw>) -> BackendResult<()> {
        Err(self.fail())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("failing")
    }
}
