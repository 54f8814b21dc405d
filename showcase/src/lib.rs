//! # showcase
//!
//! A daily movie showcase served through a two-tier cache.
//!
//! ```text
//! request ─► DailySelection ─► ShowcaseCache ─► memory (moka)
//!                 │                        └──► shared (Redis REST)
//!                 └─(miss)─► OriginStore ─► EligibilityFilter ─► ShowcaseCache::set
//! ```
//!
//! The day is resolved in one configured timezone by [`DateKeyResolver`].
//! Tier failures degrade to misses; only an origin failure after a miss is
//! reported to the client. The [`RefreshJob`](refresh::RefreshJob) keeps the
//! origin populated and never touches the cache.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod movie;
pub mod origin;
pub mod producer;
pub mod refresh;
pub mod resolver;
pub mod telemetry;

pub use cache::{CacheError, CachedShowcase, ShowcaseCache};
pub use config::ShowcaseConfig;
pub use movie::{EligibilityFilter, Movie};
pub use producer::{DailySelection, Selection};
pub use resolver::DateKeyResolver;
