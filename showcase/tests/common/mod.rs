#![allow(dead_code)]

mod backends;
mod stores;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use showcase::movie::Movie;
use showcase::{DailySelection, DateKeyResolver, EligibilityFilter, ShowcaseCache};
use showcase_core::{DateKey, ManualClock, SharedClock};
use showcase_moka::MokaBackend;

pub use backends::{FailingBackend, SharedBackend};
pub use stores::{FailingOrigin, MemoryOrigin, StaticCandidates};

/// Noon UTC on 2024-03-01, which is 07:00 in New York.
pub fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
}

pub fn shared(clock: &ManualClock) -> SharedClock {
    Arc::new(clock.clone())
}

pub fn date(s: &str) -> DateKey {
    DateKey::parse(s).unwrap()
}

pub fn movie(id: u64, title: &str, rating: f64, genre: &str) -> Movie {
    Movie::new(id, title, Some(rating)).with_genres([genre])
}

pub fn local(clock: &ManualClock) -> MokaBackend {
    MokaBackend::builder(16).clock(shared(clock)).build()
}

/// Moka in front of `remote`, default TTLs.
pub fn cache_with<R>(clock: &ManualClock, remote: R) -> ShowcaseCache
where
    R: showcase_backend::Backend + 'static,
{
    ShowcaseCache::new(local(clock), remote, shared(clock))
}

pub fn selection(
    clock: &ManualClock,
    cache: ShowcaseCache,
    origin: Arc<dyn showcase::origin::OriginStore>,
) -> DailySelection {
    DailySelection::new(
        Arc::new(DateKeyResolver::new(Some("America/New_York"))),
        Arc::new(cache),
        origin,
        EligibilityFilter::default(),
        shared(clock),
    )
}
