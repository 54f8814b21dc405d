//! Seed candidates from TMDB's discover endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use showcase_core::DateKey;
use tracing::debug;

use crate::movie::Movie;

pub const DEFAULT_TMDB_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, thiserror::Error)]
pub enum CandidateError {
    #[error("candidate request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("candidate source returned status {status}")]
    Status { status: u16 },
    #[error("invalid candidate source configuration: {0}")]
    Config(String),
}

/// Supplies movies to choose a new day's showcase from.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn candidates(&self, date: &DateKey) -> Result<Vec<Movie>, CandidateError>;
}

/// Used when no TMDB key is configured; seeding then finds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCandidates;

#[async_trait]
impl CandidateSource for NoCandidates {
    async fn candidates(&self, _date: &DateKey) -> Result<Vec<Movie>, CandidateError> {
        Ok(Vec::new())
    }
}

#[derive(Deserialize)]
struct DiscoverPage {
    #[serde(default)]
    results: Vec<Value>,
}

/// Well-rated, widely voted films from `/discover/movie`.
#[derive(Clone)]
pub struct TmdbDiscover {
    client: reqwest::Client,
    base_url: String,
    token: String,
    pages: u32,
}

impl std::fmt::Debug for TmdbDiscover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbDiscover")
            .field("base_url", &self.base_url)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

impl TmdbDiscover {
    pub fn new(
        base_url: &str,
        token: &str,
        pages: u32,
        timeout: Duration,
    ) -> Result<Self, CandidateError> {
        let base_url = base_url.trim().trim_end_matches('/');
        let token = token.trim();
        if base_url.is_empty() || token.is_empty() {
            return Err(CandidateError::Config("missing URL or token".to_owned()));
        }
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.to_owned(),
            token: token.to_owned(),
            pages: pages.max(1),
        })
    }
}

#[async_trait]
impl CandidateSource for TmdbDiscover {
    async fn candidates(&self, date: &DateKey) -> Result<Vec<Movie>, CandidateError> {
        let url = format!("{}/discover/movie", self.base_url);
        let mut movies = Vec::new();

        for page in 1..=self.pages {
            let page = page.to_string();
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .query(&[
                    ("include_adult", "false"),
                    ("sort_by", "vote_count.desc"),
                    ("page", page.as_str()),
                ])
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(CandidateError::Status {
                    status: status.as_u16(),
                });
            }
            let results = response.json::<DiscoverPage>().await?.results;
            let total = results.len();
            let before = movies.len();
            movies.extend(
                results
                    .into_iter()
                    .filter_map(|entry| serde_json::from_value::<Movie>(entry).ok()),
            );
            let dropped = total - (movies.len() - before);
            if dropped > 0 {
                debug!(date = %date, page = %page, dropped, "dropped malformed discover results");
            }
        }

        debug!(date = %date, candidates = movies.len(), "fetched discover candidates");
        Ok(movies)
    }
}
