//! Cached value type with expiration metadata.
//!
//! [`CacheValue`] wraps stored data with an optional absolute expiration
//! timestamp. Tiers never compute freshness from the wall clock directly:
//! every check takes `now` from an injected [`Clock`](crate::Clock), which
//! keeps expiry deterministic under test.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use showcase_core::CacheValue;
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
//! let value = CacheValue::new("movies", Some(now + Duration::minutes(5)));
//!
//! assert!(!value.is_expired_at(now));
//! assert_eq!(value.ttl_at(now).unwrap().as_secs(), 300);
//! assert!(value.is_expired_at(now + Duration::minutes(5)));
//! ```

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A cached value with an optional absolute expiration timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheValue<T> {
    data: T,
    expire: Option<DateTime<Utc>>,
}

impl<T> CacheValue<T> {
    /// Creates a new cache value.
    pub fn new(data: T, expire: Option<DateTime<Utc>>) -> Self {
        CacheValue { data, expire }
    }

    /// Creates a value that expires `ttl` after `now`.
    pub fn expiring_in(data: T, now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expire = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        CacheValue::new(data, Some(expire))
    }

    /// Returns a reference to the cached data.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when the data expires.
    #[inline]
    pub fn expire(&self) -> Option<DateTime<Utc>> {
        self.expire
    }

    /// Consumes the cache value and returns the inner data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Consumes the cache value and returns the expiration and data separately.
    pub fn into_parts(self) -> (Option<DateTime<Utc>>, T) {
        (self.expire, self.data)
    }

    /// Returns `true` if the value has an expiration at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire.is_some_and(|expire| expire <= now)
    }

    /// Remaining time-to-live relative to `now`.
    ///
    /// Returns `None` if there's no expire time or it has already passed.
    pub fn ttl_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expire.and_then(|expire| {
            let millis = expire.signed_duration_since(now).num_milliseconds();
            (millis > 0).then(|| Duration::from_millis(millis as u64))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn without_expire_never_expires() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let value = CacheValue::new(1, None);
        assert!(!value.is_expired_at(now));
        assert_eq!(value.ttl_at(now), None);
    }

    #[test]
    fn ttl_is_none_once_passed() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let value = CacheValue::expiring_in((), now, Duration::from_secs(10));
        assert_eq!(value.ttl_at(now + chrono::Duration::seconds(11)), None);
        assert!(value.is_expired_at(now + chrono::Duration::seconds(10)));
    }
}
