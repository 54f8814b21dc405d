//! Injectable time source.
//!
//! Every TTL decision in the cache reads "now" from a [`Clock`] owned by the
//! composition root. Production code uses [`SystemClock`]; tests enable the
//! `test-helpers` feature and drive a `ManualClock` forward explicitly.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Debug + Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock shared between the tiers and the read path.
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time via [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Returns a [`SharedClock`] backed by the system time.
    pub fn shared() -> SharedClock {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(feature = "test-helpers")]
mod manual {
    use std::sync::{Arc, RwLock};

    use chrono::{DateTime, Duration, Utc};

    use super::Clock;

    /// A clock that only moves when told to.
    ///
    /// Clones share the same instant, so a test can keep one handle and hand
    /// another to the cache.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Arc<RwLock<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Creates a clock frozen at `start`.
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(RwLock::new(start)),
            }
        }

        /// Moves the clock forward by `by`.
        pub fn advance(&self, by: std::time::Duration) {
            let by = Duration::from_std(by).unwrap_or(Duration::MAX);
            let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
            *now += by;
        }

        /// Jumps the clock to `instant`.
        pub fn set(&self, instant: DateTime<Utc>) {
            *self.now.write().unwrap_or_else(|e| e.into_inner()) = instant;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.read().unwrap_or_else(|e| e.into_inner())
        }
    }
}

#[cfg(feature = "test-helpers")]
pub use manual::ManualClock;
