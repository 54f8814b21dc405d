//! The origin store: the durable per-day showcase rows.
//!
//! Rows live in a PostgREST table (`date` primary key, `movies` JSON array).
//! The read path only ever reads one row by exact date; the refresh job
//! upserts with `date` as the conflict target.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use showcase_core::{DateKey, ShowcaseRecord};
use tracing::{debug, trace};

use crate::movie::{Movie, RawShowcaseRow};

/// Table holding one row per day.
pub const DEFAULT_TABLE: &str = "daily_showcase";

#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("origin request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("origin returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid origin configuration: {0}")]
    Config(String),
}

/// Durable store of showcase rows.
#[async_trait]
pub trait OriginStore: Send + Sync {
    /// Returns the row for `date`, or `None` if there is none.
    async fn fetch(&self, date: &DateKey) -> Result<Option<RawShowcaseRow>, OriginError>;

    /// Inserts or replaces the row for `record.date`.
    async fn upsert(&self, record: &ShowcaseRecord<Movie>) -> Result<(), OriginError>;
}

/// Stand-in when no origin credentials are configured: never has a row.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOrigin;

#[async_trait]
impl OriginStore for DisabledOrigin {
    async fn fetch(&self, date: &DateKey) -> Result<Option<RawShowcaseRow>, OriginError> {
        trace!(date = %date, "origin disabled");
        Ok(None)
    }

    async fn upsert(&self, record: &ShowcaseRecord<Movie>) -> Result<(), OriginError> {
        trace!(date = %record.date, "origin disabled, dropping upsert");
        Ok(())
    }
}

#[derive(Serialize)]
struct UpsertRow<'a> {
    date: &'a DateKey,
    movies: &'a [Movie],
    updated_at: DateTime<Utc>,
}

/// [`OriginStore`] over Supabase's PostgREST interface.
#[derive(Clone)]
pub struct SupabaseOrigin {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    table: String,
}

impl std::fmt::Debug for SupabaseOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseOrigin")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl SupabaseOrigin {
    pub fn new(
        base_url: &str,
        service_key: &str,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, OriginError> {
        let base_url = base_url.trim().trim_end_matches('/');
        let service_key = service_key.trim();
        if base_url.is_empty() || service_key.is_empty() {
            return Err(OriginError::Config("missing URL or service key".to_owned()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_owned(),
            service_key: service_key.to_owned(),
            table: table.to_owned(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OriginError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OriginError::Status {
        status: status.as_u16(),
        body: body.chars().take(256).collect(),
    })
}

#[async_trait]
impl OriginStore for SupabaseOrigin {
    async fn fetch(&self, date: &DateKey) -> Result<Option<RawShowcaseRow>, OriginError> {
        let filter = format!("eq.{date}");
        let request = self.client.get(self.table_url()).query(&[
            ("select", "date,movies"),
            ("date", filter.as_str()),
            ("limit", "1"),
        ]);
        let response = ensure_success(self.authorized(request).send().await?).await?;
        let rows: Vec<RawShowcaseRow> = response.json().await?;
        debug!(date = %date, found = !rows.is_empty(), "origin read");
        Ok(rows.into_iter().next())
    }

    async fn upsert(&self, record: &ShowcaseRecord<Movie>) -> Result<(), OriginError> {
        let row = UpsertRow {
            date: &record.date,
            movies: &record.movies,
            updated_at: record.cached_at,
        };
        let request = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", "date")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row]);
        ensure_success(self.authorized(request).send().await?).await?;
        debug!(date = %record.date, movies = record.movies.len(), "origin upsert");
        Ok(())
    }
}
