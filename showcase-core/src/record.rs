//! The unit of caching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DateKey;

/// One day's showcase as stored in the cache tiers.
///
/// The cache is generic over the movie payload `M` and never inspects it;
/// the only structural rule is that a record worth caching has at least one
/// movie. `cached_at` is informational and never used for TTL math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowcaseRecord<M> {
    /// The calendar day this record belongs to.
    pub date: DateKey,
    /// Movies in display order.
    pub movies: Vec<M>,
    /// When this record entered the cache.
    pub cached_at: DateTime<Utc>,
}

impl<M> ShowcaseRecord<M> {
    /// Creates a record stamped with `cached_at`.
    pub fn new(date: DateKey, movies: Vec<M>, cached_at: DateTime<Utc>) -> Self {
        Self {
            date,
            movies,
            cached_at,
        }
    }

    /// Returns `true` if the record carries no movies and must not be cached.
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_camel_case_fields() {
        let record = ShowcaseRecord::new(
            DateKey::parse("2024-03-01").unwrap(),
            vec![1, 2, 3],
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["movies"], serde_json::json!([1, 2, 3]));
        assert!(json.get("cachedAt").is_some());
    }

    #[test]
    fn rejects_malformed_date_on_decode() {
        let json = r#"{"date":"03/01/2024","movies":[1],"cachedAt":"2024-03-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<ShowcaseRecord<u32>>(json).is_err());
    }
}
