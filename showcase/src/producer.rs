//! Read path: resolve the day, consult the cache, fall back to the origin.

use std::sync::Arc;

use showcase_core::{CacheSource, DateKey, SharedClock};
use tracing::{debug, info, warn};

use crate::cache::ShowcaseCache;
use crate::movie::{EligibilityFilter, Movie, Validation, validate_row};
use crate::origin::{OriginError, OriginStore};
use crate::resolver::DateKeyResolver;

/// Result of a showcase lookup that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Found {
        date: DateKey,
        movies: Vec<Movie>,
        source: CacheSource,
    },
    NotFound {
        date: DateKey,
    },
}

impl Selection {
    pub fn date(&self) -> &DateKey {
        match self {
            Selection::Found { date, .. } | Selection::NotFound { date } => date,
        }
    }
}

/// Serves the showcase for a day.
///
/// Movies read from the origin are filtered before they are cached; cache
/// hits are returned as stored.
pub struct DailySelection {
    resolver: Arc<DateKeyResolver>,
    cache: Arc<ShowcaseCache>,
    origin: Arc<dyn OriginStore>,
    filter: EligibilityFilter,
    clock: SharedClock,
}

impl std::fmt::Debug for DailySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailySelection")
            .field("timezone", &self.resolver.timezone())
            .field("cache", &self.cache)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl DailySelection {
    pub fn new(
        resolver: Arc<DateKeyResolver>,
        cache: Arc<ShowcaseCache>,
        origin: Arc<dyn OriginStore>,
        filter: EligibilityFilter,
        clock: SharedClock,
    ) -> Self {
        Self {
            resolver,
            cache,
            origin,
            filter,
            clock,
        }
    }

    /// Today's key in the rollover timezone.
    pub fn today(&self) -> DateKey {
        self.resolver.resolve(self.clock.now())
    }

    /// The key a request addresses: a well-formed override, else today.
    pub fn target(&self, requested: Option<&str>) -> DateKey {
        match requested.map(DateKey::parse) {
            Some(Ok(date)) => date,
            Some(Err(err)) => {
                debug!(error = %err, "ignoring malformed date override");
                self.today()
            }
            None => self.today(),
        }
    }

    pub fn resolver(&self) -> &DateKeyResolver {
        &self.resolver
    }

    /// Returns the showcase for `requested` (or today).
    ///
    /// Only an origin failure after a cache miss is an error.
    pub async fn select(&self, requested: Option<&str>) -> Result<Selection, OriginError> {
        let date = self.target(requested);

        if let Some(hit) = self.cache.get::<Movie>(date.as_str()).await {
            return Ok(Selection::Found {
                date,
                movies: hit.movies,
                source: hit.source,
            });
        }

        let Some(row) = self.origin.fetch(&date).await? else {
            debug!(date = %date, "no origin row");
            return Ok(Selection::NotFound { date });
        };

        let record = match validate_row(row, &date, self.clock.now()) {
            Validation::Valid(record) => record,
            Validation::Invalid(reason) => {
                warn!(date = %date, %reason, "discarding malformed origin row");
                return Ok(Selection::NotFound { date });
            }
        };

        let movies = self.filter.apply(record.movies);
        if movies.is_empty() {
            debug!(date = %date, "origin row has no eligible movies");
            return Ok(Selection::NotFound { date });
        }

        if let Err(err) = self.cache.set(date.as_str(), &movies).await {
            warn!(date = %date, error = %err, "failed to cache origin read");
        }
        info!(date = %date, movies = movies.len(), "served showcase from origin");

        Ok(Selection::Found {
            date,
            movies,
            source: CacheSource::Origin,
        })
    }
}
