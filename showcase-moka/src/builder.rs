//! Builder for configuring [`MokaBackend`].

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::CacheBuilder;
use moka::policy::EvictionPolicy;
use showcase_core::{BackendLabel, CacheValue, Raw, SharedClock, ShowcaseKey, SystemClock};

use crate::backend::MokaBackend;

/// Expiration policy that derives Moka's TTL from [`CacheValue::expire`].
#[derive(Debug, Clone)]
struct Expiration {
    clock: SharedClock,
}

impl Expiry<ShowcaseKey, CacheValue<Raw>> for Expiration {
    fn expire_after_create(
        &self,
        _key: &ShowcaseKey,
        value: &CacheValue<Raw>,
        _created_at: Instant,
    ) -> Option<Duration> {
        self.calculate_ttl(value)
    }

    fn expire_after_update(
        &self,
        _key: &ShowcaseKey,
        value: &CacheValue<Raw>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // Always use the new value's expiration. Moka's default keeps the old
        // deadline, which would cut a rewritten entry short.
        self.calculate_ttl(value)
    }
}

impl Expiration {
    fn calculate_ttl(&self, value: &CacheValue<Raw>) -> Option<Duration> {
        value
            .expire()
            .map(|_| value.ttl_at(self.clock.now()).unwrap_or(Duration::ZERO))
    }
}

/// Builder for creating and configuring a [`MokaBackend`].
///
/// ```
/// use showcase_core::SystemClock;
/// use showcase_moka::{EvictionPolicy, MokaBackend};
///
/// let backend = MokaBackend::builder(64)
///     .label("local")
///     .clock(SystemClock::shared())
///     .eviction_policy(EvictionPolicy::lru())
///     .build();
/// ```
pub struct MokaBackendBuilder {
    max_capacity: u64,
    clock: SharedClock,
    label: BackendLabel,
    eviction_policy: Option<EvictionPolicy>,
}

impl MokaBackendBuilder {
    /// Creates a builder holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            clock: SystemClock::shared(),
            label: BackendLabel::new_static("moka"),
            eviction_policy: None,
        }
    }

    /// Sets a custom label for this backend.
    ///
    /// # Default
    ///
    /// `"moka"`
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the clock used for expiry decisions.
    ///
    /// # Default
    ///
    /// [`SystemClock`]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the eviction policy used when the cache reaches capacity.
    ///
    /// # Default
    ///
    /// [`EvictionPolicy::lru()`]
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Builds the [`MokaBackend`].
    pub fn build(self) -> MokaBackend {
        let policy = self.eviction_policy.unwrap_or_else(EvictionPolicy::lru);
        let cache = CacheBuilder::new(self.max_capacity)
            .eviction_policy(policy)
            .expire_after(Expiration {
                clock: self.clock.clone(),
            })
            .build();

        MokaBackend {
            cache,
            clock: self.clock,
            label: self.label,
        }
    }
}
