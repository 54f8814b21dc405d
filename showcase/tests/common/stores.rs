//! In-memory origin store and candidate source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use showcase::movie::{Movie, RawShowcaseRow};
use showcase::origin::{OriginError, OriginStore};
use showcase::refresh::{CandidateError, CandidateSource};
use showcase_core::{DateKey, ShowcaseRecord};

/// Origin rows held in memory. Clones share rows and counters.
#[derive(Clone, Default)]
pub struct MemoryOrigin {
    rows: Arc<Mutex<HashMap<String, RawShowcaseRow>>>,
    fetches: Arc<AtomicUsize>,
    upserts: Arc<Mutex<Vec<ShowcaseRecord<Movie>>>>,
}

impl MemoryOrigin {
    pub fn with_movies(date: &str, movies: &[Movie]) -> Self {
        let origin = Self::default();
        origin.insert_raw(date, json!(movies));
        origin
    }

    pub fn insert_raw(&self, date: &str, movies: Value) {
        self.rows.lock().unwrap().insert(
            date.to_owned(),
            RawShowcaseRow {
                date: json!(date),
                movies,
            },
        );
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> Vec<ShowcaseRecord<Movie>> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl OriginStore for MemoryOrigin {
    async fn fetch(&self, date: &DateKey) -> Result<Option<RawShowcaseRow>, OriginError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().unwrap().get(date.as_str()).cloned())
    }

    async fn upsert(&self, record: &ShowcaseRecord<Movie>) -> Result<(), OriginError> {
        self.upserts.lock().unwrap().push(record.clone());
        self.insert_raw(record.date.as_str(), json!(record.movies));
        Ok(())
    }
}

/// Origin that answers every call with a server error.
#[derive(Clone, Copy, Default)]
pub struct FailingOrigin;

#[async_trait]
impl OriginStore for FailingOrigin {
    async fn fetch(&self, _date: &DateKey) -> Result<Option<RawShowcaseRow>, OriginError> {
        Err(OriginError::Status {
            status: 500,
            body: "database is down".to_owned(),
        })
    }

    async fn upsert(&self, _record: &ShowcaseRecord<Movie>) -> Result<(), OriginError> {
        Err(OriginError::Status {
            status: 500,
            body: "database is down".to_owned(),
        })
    }
}

#[derive(Clone, Default)]
pub struct StaticCandidates {
    movies: Vec<Movie>,
    calls: Arc<AtomicUsize>,
}

impl StaticCandidates {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            movies,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateSource for StaticCandidates {
    async fn candidates(&self, _date: &DateKey) -> Result<Vec<Movie>, CandidateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.movies.clone())
    }
}
