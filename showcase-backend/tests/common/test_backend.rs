//! Simple in-memory test backends.

use async_trait::async_trait;
use dashmap::DashMap;
use showcase_backend::{Backend, BackendError, BackendResult};
use showcase_core::{BackendLabel, CacheValue, Clock, Raw, SharedClock, ShowcaseKey};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory backend honouring expiration against an injected clock.
///
/// Cheap to clone; clones share storage and counters.
#[derive(Clone)]
pub struct TestBackend {
    store: Arc<DashMap<ShowcaseKey, CacheValue<Raw>>>,
    clock: SharedClock,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    label: &'static str,
}

impl TestBackend {
    pub fn new(label: &'static str, clock: SharedClock) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            clock,
            reads: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(AtomicUsize::new(0)),
            label,
        }
    }

    pub fn has(&self, key: &ShowcaseKey) -> bool {
        self.store.contains_key(key)
    }

    /// Raw stored value, including its expiration, regardless of freshness.
    pub fn get_raw(&self, key: &ShowcaseKey) -> Option<CacheValue<Raw>> {
        self.store.get(key).map(|v| v.clone())
    }

    pub fn put_raw(&self, key: &ShowcaseKey, value: CacheValue<Raw>) {
        self.store.insert(key.clone(), value);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn read(&self, key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let now = self.clock.now();
        Ok(self
            .store
            .get(key)
            .filter(|v| !v.is_expired_at(now))
            .map(|v| v.clone()))
    }

    async fn write(&self, key: &ShowcaseKey, value: CacheValue<Raw>) -> BackendResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.store.insert(key.clone(), value);
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static(self.label)
    }
}

/// Backend that always returns errors.
#[derive(Clone, Default)]
pub struct ErrorBackend;

fn simulated() -> BackendError {
    BackendError::ConnectionError(Box::new(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        "simulated timeout",
    )))
}

#[async_trait]
impl Backend for ErrorBackend {
    async fn read(&self, _key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>> {
        Err(simulated())
    }

    async fn write(&self, _key: &ShowcaseKey, _value: CacheValue<Raw>) -> BackendResult<()> {
        Err(simulated())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("error")
    }
}
