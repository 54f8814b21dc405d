//! The read-path cache: process memory in front of the shared remote tier.
//!
//! [`ShowcaseCache`] is the boundary where tier errors stop. Tiers return
//! `Result`s; `get` turns every `Err` into a logged miss so the caller falls
//! through to the origin store, and `set` only reports failures of the local
//! tier.

use std::fmt::Debug;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use showcase_backend::{Backend, BackendError, CompositionBackend, Layer};
use showcase_core::key::{DEFAULT_NAMESPACE, RECORD_VERSION};
use showcase_core::{
    CacheSource, DateKey, InvalidDateKey, SharedClock, ShowcaseKey, ShowcaseRecord,
};
use smol_str::SmolStr;
use tracing::{debug, warn};

/// Lifetime of a record in the shared tier: a day plus two hours of margin.
pub const DEFAULT_REMOTE_TTL: Duration = Duration::from_secs(26 * 60 * 60);

/// Reasons a [`ShowcaseCache::set`] stored nothing.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    InvalidKey(#[from] InvalidDateKey),
    #[error("refusing to cache an empty showcase")]
    EmptyRecord,
    #[error("local cache tier failed: {0}")]
    Backend(#[from] BackendError),
}

/// A cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedShowcase<M> {
    pub movies: Vec<M>,
    pub source: CacheSource,
    pub cached_at: DateTime<Utc>,
}

type Tier = Box<dyn Backend>;

/// Two-tier showcase cache keyed by calendar day.
pub struct ShowcaseCache {
    tiers: CompositionBackend<Tier, Tier>,
    namespace: SmolStr,
    version: u32,
    ttl: Duration,
    clock: SharedClock,
}

impl Debug for ShowcaseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShowcaseCache")
            .field("tiers", &self.tiers)
            .field("namespace", &self.namespace)
            .field("version", &self.version)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ShowcaseCache {
    /// Layers `local` in front of `remote`. Pass `None::<B>` as `remote` to
    /// run with the local tier only.
    pub fn new<L, R>(local: L, remote: R, clock: SharedClock) -> Self
    where
        L: Backend + 'static,
        R: Backend + 'static,
    {
        let tiers = CompositionBackend::new(
            Box::new(local) as Tier,
            Box::new(remote) as Tier,
            clock.clone(),
        )
        .label("showcase");
        Self {
            tiers,
            namespace: SmolStr::new_static(DEFAULT_NAMESPACE),
            version: RECORD_VERSION,
            ttl: DEFAULT_REMOTE_TTL,
            clock,
        }
    }

    /// Sets how long a local entry lives before the remote tier is consulted.
    pub fn local_ttl(mut self, ttl: Duration) -> Self {
        self.tiers = self.tiers.l1_ttl(ttl);
        self
    }

    /// Sets the default TTL used by [`set`](Self::set).
    pub fn remote_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the key prefix in the shared store.
    pub fn namespace(mut self, namespace: impl Into<SmolStr>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the record version baked into every key.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    fn key(&self, date: DateKey) -> ShowcaseKey {
        ShowcaseKey::new(self.namespace.clone(), self.version, date)
    }

    /// Looks `date` up in memory, then in the remote tier.
    ///
    /// Returns `None` on a miss, for a malformed `date` (without touching any
    /// tier), and whenever a tier fails.
    pub async fn get<M>(&self, date: &str) -> Option<CachedShowcase<M>>
    where
        M: DeserializeOwned + Send,
    {
        let date = match DateKey::parse(date) {
            Ok(date) => date,
            Err(err) => {
                debug!(error = %err, "cache lookup with malformed key");
                return None;
            }
        };
        let key = self.key(date);

        match self.tiers.get::<ShowcaseRecord<M>>(&key).await {
            Ok(Some(hit)) => {
                let source = match hit.layer {
                    Layer::L1 => CacheSource::Memory,
                    Layer::L2 => CacheSource::Remote,
                };
                let record = hit.value.into_inner();
                debug!(key = %key, %source, movies = record.movies.len(), "cache hit");
                Some(CachedShowcase {
                    movies: record.movies,
                    source,
                    cached_at: record.cached_at,
                })
            }
            Ok(None) => {
                debug!(key = %key, "cache miss");
                None
            }
            Err(err) => {
                warn!(key = %key, kind = err.kind(), error = %err, "cache tier failed, treating as miss");
                None
            }
        }
    }

    /// Caches `movies` for `date` with the configured remote TTL.
    pub async fn set<M>(&self, date: &str, movies: &[M]) -> Result<(), CacheError>
    where
        M: Serialize + Sync,
    {
        self.set_with_ttl(date, movies, self.ttl).await
    }

    /// Caches `movies` for `date`: locally for `min(local ttl, ttl)`, remotely
    /// for `ttl`. A remote write failure is logged and does not fail the call.
    pub async fn set_with_ttl<M>(
        &self,
        date: &str,
        movies: &[M],
        ttl: Duration,
    ) -> Result<(), CacheError>
    where
        M: Serialize + Sync,
    {
        let date = DateKey::parse(date)?;
        if movies.is_empty() {
            return Err(CacheError::EmptyRecord);
        }

        let key = self.key(date.clone());
        let record = ShowcaseRecord::new(date, movies.iter().collect(), self.clock.now());
        self.tiers.set(&key, &record, ttl).await?;
        debug!(key = %key, movies = movies.len(), ?ttl, "cached showcase");
        Ok(())
    }
}
