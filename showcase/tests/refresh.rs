mod common;

use std::sync::Mutex;
use std::sync::Arc;

use async_trait::async_trait;
use common::{FailingOrigin, MemoryOrigin, StaticCandidates, clock, date, movie, shared};
use serde_json::json;
use showcase::movie::Movie;
use showcase::refresh::{
    MirrorError, NoCandidates, PassthroughMirror, PosterMirror, RefreshError, RefreshJob,
    RefreshStatus,
};
use showcase_core::{DateKey, ManualClock};

const STORAGE: &str = "https://cdn.example/posters/";

/// Mirrors into a fake bucket; titles starting with `!` fail.
#[derive(Default)]
struct RecordingMirror {
    uploads: Mutex<Vec<u64>>,
}

impl RecordingMirror {
    fn uploads(&self) -> Vec<u64> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl PosterMirror for RecordingMirror {
    fn is_mirrored(&self, movie: &Movie) -> bool {
        movie
            .poster_url
            .as_deref()
            .is_some_and(|url| url.starts_with(STORAGE))
    }

    async fn mirror(&self, date: &DateKey, movie: &Movie) -> Result<Option<String>, MirrorError> {
        if movie.title.starts_with('!') {
            return Err(MirrorError {
                id: movie.id,
                reason: "upload rejected".to_owned(),
            });
        }
        self.uploads.lock().unwrap().push(movie.id);
        Ok(Some(format!("{STORAGE}{date}/{}.jpg", movie.id)))
    }
}

fn mirrored(id: u64, title: &str) -> Movie {
    let mut movie = movie(id, title, 8.0, "drama");
    movie.poster_url = Some(format!("{STORAGE}2024-03-01/{id}.jpg"));
    movie
}

fn job(
    clock: &ManualClock,
    origin: &MemoryOrigin,
    candidates: StaticCandidates,
    mirror: Arc<RecordingMirror>,
) -> RefreshJob {
    RefreshJob::new(
        Arc::new(origin.clone()),
        Arc::new(candidates),
        mirror,
        shared(clock),
    )
    .showcase_size(3)
}

#[tokio::test]
async fn complete_row_is_reused_without_writes() {
    let clock = clock();
    let origin = MemoryOrigin::with_movies("2024-03-01", &[mirrored(1, "A"), mirrored(2, "B")]);
    let mirror = Arc::new(RecordingMirror::default());
    let candidates = StaticCandidates::default();

    let outcome = job(&clock, &origin, candidates.clone(), mirror.clone())
        .run(&date("2024-03-01"), false)
        .await
        .unwrap();

    assert_eq!(outcome.status, RefreshStatus::Reused);
    assert_eq!(outcome.movies, 2);
    assert!(origin.upserts().is_empty());
    assert!(mirror.uploads().is_empty());
    assert_eq!(candidates.calls(), 0);
}

#[tokio::test]
async fn rerunning_a_refreshed_day_is_a_no_op() {
    let clock = clock();
    let origin = MemoryOrigin::with_movies(
        "2024-03-01",
        &[mirrored(1, "A"), movie(2, "B", 8.0, "drama").with_poster_path("/b.jpg")],
    );
    let mirror = Arc::new(RecordingMirror::default());
    let job = job(&clock, &origin, StaticCandidates::default(), mirror.clone());

    let first = job.run(&date("2024-03-01"), false).await.unwrap();
    assert_eq!(first.status, RefreshStatus::Refreshed);
    assert_eq!((first.mirrored, first.failed), (1, 0));
    assert_eq!(mirror.uploads(), vec![2]);

    let second = job.run(&date("2024-03-01"), false).await.unwrap();
    assert_eq!(second.status, RefreshStatus::Reused);
    assert_eq!(mirror.uploads(), vec![2]);
    assert_eq!(origin.upserts().len(), 1);
}

#[tokio::test]
async fn force_remirrors_everything() {
    let clock = clock();
    let origin = MemoryOrigin::with_movies("2024-03-01", &[mirrored(1, "A"), mirrored(2, "B")]);
    let mirror = Arc::new(RecordingMirror::default());

    let outcome = job(&clock, &origin, StaticCandidates::default(), mirror.clone())
        .run(&date("2024-03-01"), true)
        .await
        .unwrap();

    assert_eq!(outcome.status, RefreshStatus::Refreshed);
    assert_eq!(outcome.mirrored, 2);
    assert_eq!(mirror.uploads(), vec![1, 2]);
    assert_eq!(origin.upserts().len(), 1);
}

#[tokio::test]
async fn failed_upload_keeps_the_original_poster() {
    let clock = clock();
    let mut broken = movie(5, "!Broken", 8.0, "drama");
    broken.poster_url = Some("https://image.tmdb.org/t/p/w500/broken.jpg".to_owned());
    let origin = MemoryOrigin::with_movies("2024-03-01", &[broken.clone(), movie(6, "Fine", 8.0, "drama")]);
    let mirror = Arc::new(RecordingMirror::default());

    let outcome = job(&clock, &origin, StaticCandidates::default(), mirror)
        .run(&date("2024-03-01"), false)
        .await
        .unwrap();

    assert_eq!((outcome.mirrored, outcome.failed), (1, 1));
    let written = &origin.upserts()[0];
    assert_eq!(written.movies[0].poster_url, broken.poster_url);
    assert_eq!(
        written.movies[1].poster_url.as_deref(),
        Some("https://cdn.example/posters/2024-03-01/6.jpg")
    );
}

#[tokio::test]
async fn missing_row_is_seeded_from_eligible_candidates() {
    let clock = clock();
    let origin = MemoryOrigin::default();
    let mut pool: Vec<Movie> = (1..=8).map(|id| movie(id, "Good", 7.5, "drama")).collect();
    pool.push(movie(90, "Low", 3.0, "drama"));
    pool.push(movie(91, "Doc", 9.0, "documentary"));
    let candidates = StaticCandidates::new(pool);
    let mirror = Arc::new(RecordingMirror::default());

    let outcome = job(&clock, &origin, candidates.clone(), mirror)
        .run(&date("2024-03-01"), false)
        .await
        .unwrap();

    assert_eq!(outcome.status, RefreshStatus::Seeded);
    assert_eq!(outcome.movies, 3);
    assert_eq!(candidates.calls(), 1);

    let written = &origin.upserts()[0];
    assert_eq!(written.date, date("2024-03-01"));
    assert!(written.movies.iter().all(|m| m.id <= 8));
}

#[tokio::test]
async fn malformed_row_is_replaced_by_a_seed() {
    let clock = clock();
    let origin = MemoryOrigin::default();
    origin.insert_raw("2024-03-01", json!({"broken": true}));
    let candidates = StaticCandidates::new(vec![movie(1, "Good", 7.5, "drama")]);

    let outcome = job(&clock, &origin, candidates, Arc::default())
        .run(&date("2024-03-01"), false)
        .await
        .unwrap();

    assert_eq!(outcome.status, RefreshStatus::Seeded);
}

#[tokio::test]
async fn seeding_without_candidates_fails() {
    let clock = clock();
    let origin = MemoryOrigin::default();
    let job = RefreshJob::new(
        Arc::new(origin.clone()),
        Arc::new(NoCandidates),
        Arc::new(PassthroughMirror),
        shared(&clock),
    );

    let result = job.run(&date("2024-03-01"), false).await;
    assert!(matches!(result, Err(RefreshError::NoCandidates(_))));
    assert!(origin.upserts().is_empty());
}

#[tokio::test]
async fn passthrough_mirror_reuses_any_existing_row() {
    let clock = clock();
    let origin = MemoryOrigin::with_movies("2024-03-01", &[movie(1, "A", 8.0, "drama")]);
    let job = RefreshJob::new(
        Arc::new(origin.clone()),
        Arc::new(NoCandidates),
        Arc::new(PassthroughMirror),
        shared(&clock),
    );

    let outcome = job.run(&date("2024-03-01"), false).await.unwrap();
    assert_eq!(outcome.status, RefreshStatus::Reused);
}

#[tokio::test]
async fn origin_failure_aborts_the_run() {
    let clock = clock();
    let job = RefreshJob::new(
        Arc::new(FailingOrigin),
        Arc::new(NoCandidates),
        Arc::new(PassthroughMirror),
        shared(&clock),
    );

    let result = job.run(&date("2024-03-01"), false).await;
    assert!(matches!(result, Err(RefreshError::Origin(_))));
}
