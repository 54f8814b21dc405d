//! Movie payload, origin-row validation and the eligibility filter.
//!
//! Rows read from the origin store are loosely shaped JSON. Nothing from them
//! reaches the cache until [`validate_row`] has turned the row into a
//! [`ShowcaseRecord<Movie>`] and [`EligibilityFilter::apply`] has removed the
//! movies the showcase never displays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use showcase_core::{DateKey, ShowcaseRecord};
use tracing::debug;

/// TMDB genre id for documentaries.
pub const DOCUMENTARY_GENRE_ID: u32 = 99;

/// One entry of the showcase.
///
/// Fields the service does not interpret are kept in `extra` and written back
/// unchanged. `rating` falls back to TMDB's `vote_average`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MovieFields")]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genre_ids: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct MovieFields {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default, deserialize_with = "genre_names")]
    genres: Vec<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    poster_url: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<MovieFields> for Movie {
    fn from(fields: MovieFields) -> Self {
        let mut extra = fields.extra;
        // An explicit rating wins; a separate vote_average is kept verbatim.
        let rating = match (fields.rating, fields.vote_average) {
            (Some(rating), Some(vote_average)) => {
                extra.insert("vote_average".to_owned(), Value::from(vote_average));
                Some(rating)
            }
            (rating, vote_average) => rating.or(vote_average),
        };
        Self {
            id: fields.id,
            title: fields.title,
            rating,
            genres: fields.genres,
            genre_ids: fields.genre_ids,
            poster_path: fields.poster_path,
            poster_url: fields.poster_url,
            overview: fields.overview,
            release_date: fields.release_date,
            extra,
        }
    }
}

impl Movie {
    /// Creates a movie with only the fields the filter looks at.
    pub fn new(id: u64, title: impl Into<String>, rating: Option<f64>) -> Self {
        Self {
            id,
            title: title.into(),
            rating,
            genres: Vec::new(),
            genre_ids: Vec::new(),
            poster_path: None,
            poster_url: None,
            overview: None,
            release_date: None,
            extra: Map::new(),
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_genre_ids(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.genre_ids = ids.into_iter().collect();
        self
    }

    pub fn with_poster_path(mut self, path: impl Into<String>) -> Self {
        self.poster_path = Some(path.into());
        self
    }
}

// Genres arrive either as plain names or as TMDB `{"id": .., "name": ..}` objects.
fn genre_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Genre {
        Name(String),
        Object { name: String },
    }

    let genres = Option::<Vec<Genre>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(genres
        .into_iter()
        .map(|genre| match genre {
            Genre::Name(name) | Genre::Object { name } => name,
        })
        .collect())
}

/// A row as the origin store returns it, before any validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShowcaseRow {
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub movies: Value,
}

/// Outcome of [`validate_row`].
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid(ShowcaseRecord<Movie>),
    Invalid(String),
}

/// Checks an origin row against `expected` and parses its movies.
///
/// The date must be a well-formed key equal to `expected` and `movies` must
/// be an array. Entries that do not parse as a [`Movie`] are dropped, so a
/// valid record may still be empty.
pub fn validate_row(row: RawShowcaseRow, expected: &DateKey, now: DateTime<Utc>) -> Validation {
    let date = match row.date.as_str().map(DateKey::parse) {
        Some(Ok(date)) => date,
        Some(Err(err)) => return Validation::Invalid(err.to_string()),
        None => return Validation::Invalid(format!("date is not a string: {}", row.date)),
    };
    if &date != expected {
        return Validation::Invalid(format!("row is for {date}, expected {expected}"));
    }

    let Value::Array(entries) = row.movies else {
        return Validation::Invalid("movies is not an array".to_owned());
    };

    let total = entries.len();
    let movies: Vec<Movie> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if movies.len() < total {
        debug!(date = %date, dropped = total - movies.len(), "dropped malformed movies");
    }

    Validation::Valid(ShowcaseRecord::new(date, movies, now))
}

/// Quality and genre gate applied to movies read from the origin store.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityFilter {
    pub min_rating: f64,
    /// Lowercase genre names.
    pub excluded_genres: Vec<String>,
    pub excluded_genre_ids: Vec<u32>,
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self {
            min_rating: 6.0,
            excluded_genres: vec!["documentary".to_owned()],
            excluded_genre_ids: vec![DOCUMENTARY_GENRE_ID],
        }
    }
}

impl EligibilityFilter {
    pub fn is_eligible(&self, movie: &Movie) -> bool {
        let rated = movie
            .rating
            .is_some_and(|rating| rating.is_finite() && rating >= self.min_rating);
        if !rated {
            return false;
        }

        let excluded_name = movie.genres.iter().any(|genre| {
            self.excluded_genres
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(genre.trim()))
        });
        let excluded_id = movie
            .genre_ids
            .iter()
            .any(|id| self.excluded_genre_ids.contains(id));

        !(excluded_name || excluded_id)
    }

    /// Keeps eligible movies in their original order.
    pub fn apply(&self, movies: Vec<Movie>) -> Vec<Movie> {
        movies
            .into_iter()
            .filter(|movie| self.is_eligible(movie))
            .collect()
    }
}
