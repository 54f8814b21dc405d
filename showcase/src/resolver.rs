//! Wall-clock time to [`DateKey`] in the rollover timezone.
//!
//! The showcase rotates at local midnight of a single configured IANA
//! timezone. The zone is parsed once when the resolver is built; an unknown
//! name degrades to UTC and is reported through [`DateKeyResolver::is_fallback`]
//! instead of failing startup.

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use showcase_core::DateKey;
use tracing::{debug, warn};

/// Zone used when no rollover timezone is configured.
pub const DEFAULT_ROLLOVER_TIMEZONE: &str = "America/New_York";

/// Resolves "today" for the showcase.
#[derive(Debug, Clone)]
pub struct DateKeyResolver {
    zone: Tz,
    fallback: bool,
}

impl DateKeyResolver {
    /// Builds a resolver for `configured`, using [`DEFAULT_ROLLOVER_TIMEZONE`]
    /// when it is `None` or blank.
    pub fn new(configured: Option<&str>) -> Self {
        let requested = configured
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_ROLLOVER_TIMEZONE);

        match requested.parse::<Tz>() {
            Ok(zone) => Self {
                zone,
                fallback: false,
            },
            Err(err) => {
                warn!(timezone = requested, error = %err, "unknown rollover timezone, falling back to UTC");
                Self {
                    zone: Tz::UTC,
                    fallback: true,
                }
            }
        }
    }

    /// Returns the effective IANA zone name.
    pub fn timezone(&self) -> &'static str {
        self.zone.name()
    }

    /// Returns `true` if the configured zone was rejected and UTC is used instead.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Returns the calendar day of `now` in the effective zone.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateKey {
        let local = now.with_timezone(&self.zone).date_naive();
        DateKey::from_date(local).unwrap_or_else(|| {
            debug!(%now, "local date out of key range, using UTC prefix");
            utc_prefix(now)
        })
    }
}

impl Default for DateKeyResolver {
    fn default() -> Self {
        Self::new(None)
    }
}

fn utc_prefix(now: DateTime<Utc>) -> DateKey {
    let iso = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    iso.get(..10)
        .and_then(|prefix| DateKey::parse(prefix).ok())
        .unwrap_or_else(|| DateKey::clamped(now.date_naive()))
}
