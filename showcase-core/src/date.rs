//! Calendar day keys.
//!
//! A [`DateKey`] is the only identifier the showcase cache understands. It is
//! checked for *shape* only: `2024-02-31` is accepted. Callers that forward a
//! client-supplied override are trusted for the form of the key, never for
//! calendar correctness; an impossible day simply finds nothing downstream.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use smol_str::SmolStr;

// ASCII digits only: `\d` would also accept other Unicode decimal digits.
static DATE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date key pattern is valid")
});

/// Returns `true` iff `s` has the exact form `YYYY-MM-DD`.
///
/// ```
/// use showcase_core::date::is_valid_date_key;
///
/// assert!(is_valid_date_key("2024-03-01"));
/// assert!(is_valid_date_key("2024-02-31"));
/// assert!(!is_valid_date_key("2024-3-1"));
/// assert!(!is_valid_date_key("not-a-date"));
/// assert!(!is_valid_date_key(" 2024-03-01"));
/// ```
pub fn is_valid_date_key(s: &str) -> bool {
    DATE_KEY_PATTERN.is_match(s)
}

/// Error returned when a string is not shaped like `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date key {0:?}, expected YYYY-MM-DD")]
pub struct InvalidDateKey(pub String);

/// A calendar day in the configured rollover timezone, formatted `YYYY-MM-DD`.
///
/// The inner string always matches `^[0-9]{4}-[0-9]{2}-[0-9]{2}$`; the only
/// way to build one is through [`DateKey::parse`] (or its `FromStr` /
/// `Deserialize` equivalents).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DateKey(SmolStr);

impl DateKey {
    /// Validates and wraps a date key.
    pub fn parse(s: impl AsRef<str>) -> Result<Self, InvalidDateKey> {
        let s = s.as_ref();
        if is_valid_date_key(s) {
            Ok(Self(SmolStr::new(s)))
        } else {
            Err(InvalidDateKey(s.to_owned()))
        }
    }

    /// Formats a calendar date, or `None` if its year has more than four digits
    /// or is negative.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        (0..=9999)
            .contains(&date.year())
            .then(|| Self::from_parts(date.year(), date.month(), date.day()))
    }

    /// Formats a calendar date, clamping the year into `0000..=9999`.
    pub fn clamped(date: NaiveDate) -> Self {
        Self::from_parts(date.year().clamp(0, 9999), date.month(), date.day())
    }

    fn from_parts(year: i32, month: u32, day: u32) -> Self {
        Self(smol_str::format_smolstr!("{year:04}-{month:02}-{day:02}"))
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DateKey {
    type Err = InvalidDateKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for DateKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = SmolStr::deserialize(deserializer)?;
        DateKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}
