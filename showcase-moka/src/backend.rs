//! Moka backend implementation.

use async_trait::async_trait;
use moka::future::Cache;
use showcase_backend::{Backend, BackendResult};
use showcase_core::{BackendLabel, CacheValue, Raw, SharedClock, ShowcaseKey};
use tracing::trace;

/// In-memory cache backend powered by Moka.
///
/// `MokaBackend` is the process-local tier: a bounded, concurrent map from
/// [`ShowcaseKey`] to stored bytes. Different keys never block each other;
/// concurrent writes to the same key are last-write-wins.
///
/// # Examples
///
/// ```
/// use showcase_moka::MokaBackend;
///
/// let backend = MokaBackend::builder(64).build();
/// ```
///
/// # Expiration
///
/// Each entry carries an absolute expiration. Moka evicts entries in the
/// background once that instant passes, and `read` additionally compares the
/// expiration against the injected clock, so an entry is never served past
/// its deadline even before eviction runs.
#[derive(Clone)]
pub struct MokaBackend {
    pub(crate) cache: Cache<ShowcaseKey, CacheValue<Raw>>,
    pub(crate) clock: SharedClock,
    pub(crate) label: BackendLabel,
}

impl std::fmt::Debug for MokaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl MokaBackend {
    /// Creates a new builder for `MokaBackend` with the specified maximum capacity.
    ///
    /// The `max_capacity` determines the maximum number of days held at once.
    pub fn builder(max_capacity: u64) -> crate::builder::MokaBackendBuilder {
        crate::builder::MokaBackendBuilder::new(max_capacity)
    }

    /// Returns the underlying Moka cache.
    pub fn cache(&self) -> &Cache<ShowcaseKey, CacheValue<Raw>> {
        &self.cache
    }
}

#[async_trait]
impl Backend for MokaBackend {
    async fn read(&self, key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>> {
        let Some(value) = self.cache.get(key).await else {
            return Ok(None);
        };
        if value.is_expired_at(self.clock.now()) {
            trace!(key = %key, "dropping expired local entry");
            self.cache.invalidate(key).await;
            return Ok(None);
        }
        Ok(Some(value))
    }

    async fn write(&self, key: &ShowcaseKey, value: CacheValue<Raw>) -> BackendResult<()> {
        self.cache.insert(key.clone(), value).await;
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }
}
