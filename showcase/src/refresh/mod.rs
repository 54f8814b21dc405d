//! The refresh job: make sure the origin holds a complete row for a day.
//!
//! The job only talks to the origin store, the candidate source and the
//! poster mirror. It never writes the read-path cache; readers see a
//! refreshed row once their cached copy expires.

mod mirror;
mod tmdb;

use std::collections::HashSet;
use std::sync::Arc;

use futures::{StreamExt, stream};
use serde::Serialize;
use sha2::{Digest, Sha256};
use showcase_core::{DateKey, SharedClock, ShowcaseRecord};
use tracing::{debug, info, warn};

pub use mirror::{MirrorError, PassthroughMirror, PosterMirror};
pub use tmdb::{CandidateError, CandidateSource, DEFAULT_TMDB_URL, NoCandidates, TmdbDiscover};

use crate::movie::{EligibilityFilter, Movie, Validation, validate_row};
use crate::origin::{OriginError, OriginStore};

pub const DEFAULT_SHOWCASE_SIZE: usize = 10;

const DEFAULT_MIRROR_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    /// The row was complete; nothing was written.
    Reused,
    /// An existing row was re-mirrored and written back.
    Refreshed,
    /// A new row was picked from candidates.
    Seeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub date: DateKey,
    pub status: RefreshStatus,
    pub movies: usize,
    pub mirrored: usize,
    pub failed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Origin(#[from] OriginError),
    #[error(transparent)]
    Candidates(#[from] CandidateError),
    #[error("no eligible candidates for {0}")]
    NoCandidates(DateKey),
}

pub struct RefreshJob {
    origin: Arc<dyn OriginStore>,
    candidates: Arc<dyn CandidateSource>,
    mirror: Arc<dyn PosterMirror>,
    filter: EligibilityFilter,
    showcase_size: usize,
    mirror_concurrency: usize,
    clock: SharedClock,
}

impl std::fmt::Debug for RefreshJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshJob")
            .field("filter", &self.filter)
            .field("showcase_size", &self.showcase_size)
            .finish_non_exhaustive()
    }
}

impl RefreshJob {
    pub fn new(
        origin: Arc<dyn OriginStore>,
        candidates: Arc<dyn CandidateSource>,
        mirror: Arc<dyn PosterMirror>,
        clock: SharedClock,
    ) -> Self {
        Self {
            origin,
            candidates,
            mirror,
            filter: EligibilityFilter::default(),
            showcase_size: DEFAULT_SHOWCASE_SIZE,
            mirror_concurrency: DEFAULT_MIRROR_CONCURRENCY,
            clock,
        }
    }

    pub fn filter(mut self, filter: EligibilityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn showcase_size(mut self, size: usize) -> Self {
        self.showcase_size = size.max(1);
        self
    }

    pub fn mirror_concurrency(mut self, concurrency: usize) -> Self {
        self.mirror_concurrency = concurrency.max(1);
        self
    }

    /// Reuses, refreshes or seeds the row for `date`.
    ///
    /// A complete row is left alone unless `force` is set, so repeated runs
    /// for the same day upload nothing.
    pub async fn run(&self, date: &DateKey, force: bool) -> Result<RefreshOutcome, RefreshError> {
        let (mut movies, status) = match self.existing(date).await? {
            Some(movies) => {
                if !force && movies.iter().all(|movie| self.mirror.is_mirrored(movie)) {
                    info!(date = %date, movies = movies.len(), "showcase already complete");
                    return Ok(RefreshOutcome {
                        date: date.clone(),
                        status: RefreshStatus::Reused,
                        movies: movies.len(),
                        mirrored: 0,
                        failed: 0,
                    });
                }
                (movies, RefreshStatus::Refreshed)
            }
            None => (self.seed(date).await?, RefreshStatus::Seeded),
        };

        let (mirrored, failed) = self.mirror_posters(date, &mut movies, force).await;
        let record = ShowcaseRecord::new(date.clone(), movies, self.clock.now());
        self.origin.upsert(&record).await?;

        info!(date = %date, ?status, movies = record.movies.len(), mirrored, failed, "showcase refreshed");
        Ok(RefreshOutcome {
            date: date.clone(),
            status,
            movies: record.movies.len(),
            mirrored,
            failed,
        })
    }

    async fn existing(&self, date: &DateKey) -> Result<Option<Vec<Movie>>, RefreshError> {
        let Some(row) = self.origin.fetch(date).await? else {
            return Ok(None);
        };
        match validate_row(row, date, self.clock.now()) {
            Validation::Valid(record) if !record.is_empty() => Ok(Some(record.movies)),
            Validation::Valid(_) => Ok(None),
            Validation::Invalid(reason) => {
                warn!(date = %date, %reason, "replacing malformed origin row");
                Ok(None)
            }
        }
    }

    async fn seed(&self, date: &DateKey) -> Result<Vec<Movie>, RefreshError> {
        let candidates = self.filter.apply(self.candidates.candidates(date).await?);
        let picked = pick_daily(date, candidates, self.showcase_size);
        if picked.is_empty() {
            return Err(RefreshError::NoCandidates(date.clone()));
        }
        debug!(date = %date, picked = picked.len(), "seeded showcase");
        Ok(picked)
    }

    async fn mirror_posters(
        &self,
        date: &DateKey,
        movies: &mut [Movie],
        force: bool,
    ) -> (usize, usize) {
        let pending: Vec<(usize, Movie)> = movies
            .iter()
            .enumerate()
            .filter(|(_, movie)| force || !self.mirror.is_mirrored(movie))
            .map(|(index, movie)| (index, movie.clone()))
            .collect();
        let results: Vec<_> = stream::iter(pending)
            .map(|(index, movie)| async move { (index, self.mirror.mirror(date, &movie).await) })
            .buffered(self.mirror_concurrency)
            .collect()
            .await;

        let (mut mirrored, mut failed) = (0, 0);
        for (index, result) in results {
            match result {
                Ok(Some(url)) => {
                    movies[index].poster_url = Some(url);
                    mirrored += 1;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(date = %date, error = %err, "keeping original poster");
                    failed += 1;
                }
            }
        }
        (mirrored, failed)
    }
}

/// Picks `count` movies for `date`.
///
/// Movies are ordered by SHA-256 of the date and their id, so the same
/// candidates always give the same showcase for a day and a different one
/// the next day. Duplicate ids keep their first occurrence.
pub fn pick_daily(date: &DateKey, movies: Vec<Movie>, count: usize) -> Vec<Movie> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<([u8; 32], Movie)> = movies
        .into_iter()
        .filter(|movie| seen.insert(movie.id))
        .map(|movie| (rank(date, movie.id), movie))
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0));
    ranked
        .into_iter()
        .take(count)
        .map(|(_, movie)| movie)
        .collect()
}

fn rank(date: &DateKey, id: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(date.as_str().as_bytes());
    hasher.update(id.to_be_bytes());
    hasher.finalize().into()
}
