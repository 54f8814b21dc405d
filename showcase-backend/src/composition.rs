//! Two-tier composition: a fast process-local layer in front of a shared one.
//!
//! - L1 (first layer): the process-local cache, short TTL
//! - L2 (second layer): the shared remote cache, long TTL
//!
//! # Read Strategy
//! 1. Check L1 → Hit: return value
//! 2. Check L2 → Hit: decode, admit, refill L1, return value
//! 3. Miss: return `None` (the caller reads the origin, then `set()` populates both layers)
//!
//! An L1 read failure is logged and skipped. An L2 read failure is returned to
//! the caller, which decides whether it is fatal; for the showcase it never is.
//!
//! # Write Strategy
//! - Write-through, L1 first
//! - L1 entries live for `min(ttl, l1_ttl)`, L2 entries for the full `ttl`
//! - An L2 write failure is logged and swallowed; the result reflects L1 only
//!
//! # Refill TTL
//! A value promoted from L2 into L1 expires at
//! `min(now + l1_ttl, l2_expire)`, so L1 never outlives the shared copy.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use showcase_core::{BackendLabel, CacheValue, SharedClock, ShowcaseKey};
use tracing::{debug, warn};

use crate::backend::decode;
use crate::metrics::{self, ReadResult};
use crate::{Admissible, Backend, BackendResult};

/// Default lifetime of an L1 entry.
pub const DEFAULT_L1_TTL: Duration = Duration::from_secs(5 * 60);

/// Which layer served a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// First (process-local) layer.
    L1,
    /// Second (shared) layer.
    L2,
}

/// A decoded value together with the layer it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Layered<T> {
    pub value: CacheValue<T>,
    pub layer: Layer,
}

/// A backend that composes two cache backends into a layered caching system.
pub struct CompositionBackend<L1, L2>
where
    L1: Backend,
    L2: Backend,
{
    /// First-layer cache (fast, local)
    l1: L1,
    /// Second-layer cache (shared, long-lived)
    l2: L2,
    l1_ttl: Duration,
    clock: SharedClock,
    label: BackendLabel,
}

impl<L1, L2> std::fmt::Debug for CompositionBackend<L1, L2>
where
    L1: Backend,
    L2: Backend,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionBackend")
            .field("label", &self.label)
            .field("l1", &self.l1.label())
            .field("l2", &self.l2.label())
            .field("l1_ttl", &self.l1_ttl)
            .finish()
    }
}

impl<L1, L2> CompositionBackend<L1, L2>
where
    L1: Backend,
    L2: Backend,
{
    /// Creates a composition with [`DEFAULT_L1_TTL`].
    pub fn new(l1: L1, l2: L2, clock: SharedClock) -> Self {
        Self {
            l1,
            l2,
            l1_ttl: DEFAULT_L1_TTL,
            clock,
            label: BackendLabel::new_static("composition"),
        }
    }

    /// Sets the fixed L1 window.
    pub fn l1_ttl(mut self, ttl: Duration) -> Self {
        self.l1_ttl = ttl;
        self
    }

    /// Sets the label used in logs and metrics.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Returns the first layer.
    pub fn l1(&self) -> &L1 {
        &self.l1
    }

    /// Returns the second layer.
    pub fn l2(&self) -> &L2 {
        &self.l2
    }

    /// Reads and decodes `key`, falling back from L1 to L2.
    pub async fn get<T>(&self, key: &ShowcaseKey) -> BackendResult<Option<Layered<T>>>
    where
        T: DeserializeOwned + Admissible + Send,
    {
        let l1_label = self.label.compose(&self.l1.label());
        let l1_read = match self.l1.read(key).await {
            Ok(Some(raw)) => decode::<T>(self.l1.value_format(), key, raw),
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        };
        match l1_read {
            Ok(Some(value)) => {
                metrics::record_read(l1_label.as_str(), ReadResult::Hit);
                return Ok(Some(Layered {
                    value,
                    layer: Layer::L1,
                }));
            }
            Ok(None) => metrics::record_read(l1_label.as_str(), ReadResult::Miss),
            Err(err) => {
                metrics::record_read(l1_label.as_str(), ReadResult::Error);
                warn!(key = %key, backend = %l1_label, error = %err, "L1 read failed, falling back to L2");
            }
        }

        let l2_label = self.label.compose(&self.l2.label());
        let raw = match self.l2.read(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                metrics::record_read(l2_label.as_str(), ReadResult::Miss);
                return Ok(None);
            }
            Err(err) => {
                metrics::record_read(l2_label.as_str(), ReadResult::Error);
                return Err(err);
            }
        };

        let refill = CacheValue::new(raw.data().clone(), Some(self.l1_expire(raw.expire())));
        let value = match decode::<T>(self.l2.value_format(), key, raw) {
            Ok(Some(value)) => value,
            Ok(None) => {
                metrics::record_read(l2_label.as_str(), ReadResult::Miss);
                return Ok(None);
            }
            Err(err) => {
                metrics::record_read(l2_label.as_str(), ReadResult::Error);
                return Err(err);
            }
        };
        metrics::record_read(l2_label.as_str(), ReadResult::Hit);

        debug!(key = %key, backend = %l1_label, "refilling L1 from L2");
        let refilled = self.l1.write(key, refill).await;
        metrics::record_write(l1_label.as_str(), refilled.is_ok());
        if let Err(err) = refilled {
            warn!(key = %key, backend = %l1_label, error = %err, "L1 refill failed");
        }

        Ok(Some(Layered {
            value,
            layer: Layer::L2,
        }))
    }

    /// Encodes `data` once and writes it through both layers.
    ///
    /// Returns the L1 result; L2 failures are logged only.
    pub async fn set<T>(&self, key: &ShowcaseKey, data: &T, ttl: Duration) -> BackendResult<()>
    where
        T: Serialize + Sync,
    {
        let raw = self.l1.value_format().serialize(data)?;
        let now = self.clock.now();

        let l1_label = self.label.compose(&self.l1.label());
        let l1_value = CacheValue::expiring_in(raw.clone(), now, ttl.min(self.l1_ttl));
        let l1_result = self.l1.write(key, l1_value).await;
        metrics::record_write(l1_label.as_str(), l1_result.is_ok());
        if let Err(err) = &l1_result {
            warn!(key = %key, backend = %l1_label, error = %err, "L1 write failed");
        }

        let l2_label = self.label.compose(&self.l2.label());
        let l2_result = self
            .l2
            .write(key, CacheValue::expiring_in(raw, now, ttl))
            .await;
        metrics::record_write(l2_label.as_str(), l2_result.is_ok());
        if let Err(err) = l2_result {
            warn!(key = %key, backend = %l2_label, error = %err, "L2 write failed, keeping L1 only");
        }

        l1_result
    }

    fn l1_expire(&self, l2_expire: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let window = CacheValue::expiring_in((), self.clock.now(), self.l1_ttl)
            .expire()
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        match l2_expire {
            Some(l2_expire) => window.min(l2_expire),
            None => window,
        }
    }
}
