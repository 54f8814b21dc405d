#![warn(missing_docs)]
//! # showcase-core
//!
//! Core types shared by every tier of the daily showcase cache.
//!
//! The daily showcase is a list of movies that rotates once per calendar day
//! in a configured timezone. This crate defines the vocabulary the cache
//! tiers and the read path agree on:
//!
//! - [`DateKey`] - a validated `YYYY-MM-DD` calendar day
//! - [`ShowcaseKey`] - the namespaced, versioned storage key for a day
//! - [`ShowcaseRecord`] - the unit of caching (date, movies, `cached_at`)
//! - [`CacheValue`] - stored bytes with an absolute expiration timestamp
//! - [`Clock`] - injectable time source for every expiry decision
//! - [`CacheSource`] - which tier (or the origin) served a read
//!
//! ## Feature Flags
//!
//! - `test-helpers` - Enables [`ManualClock`](clock::ManualClock)
//!

pub mod clock;
pub mod date;
pub mod key;
pub mod label;
pub mod record;
pub mod source;
pub mod value;

#[cfg(feature = "test-helpers")]
pub use clock::ManualClock;
pub use clock::{Clock, SharedClock, SystemClock};
pub use date::{DateKey, InvalidDateKey};
pub use key::ShowcaseKey;
pub use label::BackendLabel;
pub use record::ShowcaseRecord;
pub use source::CacheSource;
pub use value::CacheValue;

/// Raw byte data type used for serialized cache values.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
