//! HTTP surface.
//!
//! - `GET /api/daily-showcase` - today's showcase, `?date=` to override the
//!   day, `?ping=1` for resolver diagnostics without touching any store
//! - `POST /api/daily-showcase/refresh` - runs the refresh job, bearer
//!   `CRON_SECRET` required
//! - `GET /healthz`

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use showcase_core::{CacheSource, DateKey};
use subtle::ConstantTimeEq;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::movie::Movie;
use crate::origin::OriginError;
use crate::producer::{DailySelection, Selection};
use crate::refresh::{RefreshError, RefreshJob, RefreshOutcome};

/// Edge caching for successful showcase responses.
pub const SHOWCASE_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=3600";

#[derive(Clone)]
pub struct AppState {
    pub selection: Arc<DailySelection>,
    /// `None` when the refresh endpoint is disabled.
    pub refresh: Option<Arc<RefreshEndpoint>>,
}

/// The refresh job together with the secret guarding it.
pub struct RefreshEndpoint {
    pub job: RefreshJob,
    pub secret: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/daily-showcase", get(showcase))
        .route("/api/daily-showcase/refresh", post(refresh))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no showcase for {0}")]
    NotFound(DateKey),
    #[error("showcase store unavailable")]
    Origin(#[from] OriginError),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    BadDate(String),
    #[error("missing or invalid refresh secret")]
    Unauthorized,
    #[error("refresh is not configured")]
    RefreshDisabled,
    #[error("refresh failed: {0}")]
    Refresh(#[from] RefreshError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadDate(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RefreshDisabled => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Origin(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Refresh(RefreshError::NoCandidates(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Refresh(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Origin(_) => "origin_unavailable",
            ApiError::BadDate(_) => "invalid_date",
            ApiError::Unauthorized => "unauthorized",
            ApiError::RefreshDisabled => "refresh_disabled",
            ApiError::Refresh(RefreshError::NoCandidates(_)) => "no_candidates",
            ApiError::Refresh(_) => "refresh_failed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = json!({
            "success": false,
            "error": { "code": self.code(), "message": self.to_string() },
        });
        (
            status,
            [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
            Json(body),
        )
            .into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ShowcaseQuery {
    date: Option<String>,
    ping: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RefreshQuery {
    date: Option<String>,
    force: Option<String>,
}

fn flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1" | "true" | "yes"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Ping<'a> {
    success: bool,
    ping: bool,
    timezone: &'a str,
    timezone_fallback: bool,
    date: DateKey,
}

#[derive(Serialize)]
struct ShowcaseBody {
    success: bool,
    date: DateKey,
    source: CacheSource,
    movies: Vec<Movie>,
}

async fn showcase(
    State(state): State<AppState>,
    Query(query): Query<ShowcaseQuery>,
) -> Result<Response, ApiError> {
    let selection = &state.selection;

    if flag(query.ping.as_deref()) {
        let resolver = selection.resolver();
        return Ok(Json(Ping {
            success: true,
            ping: true,
            timezone: resolver.timezone(),
            timezone_fallback: resolver.is_fallback(),
            date: selection.target(query.date.as_deref()),
        })
        .into_response());
    }

    match selection.select(query.date.as_deref()).await? {
        Selection::Found {
            date,
            movies,
            source,
        } => Ok((
            [(
                header::CACHE_CONTROL,
                HeaderValue::from_static(SHOWCASE_CACHE_CONTROL),
            )],
            Json(ShowcaseBody {
                success: true,
                date,
                source,
                movies,
            }),
        )
            .into_response()),
        Selection::NotFound { date } => Err(ApiError::NotFound(date)),
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Constant-time comparison of the SHA-256 digests.
fn secret_matches(given: Option<&str>, secret: &str) -> bool {
    let Some(given) = given else {
        return false;
    };
    let (given, secret) = (Sha256::digest(given), Sha256::digest(secret));
    given.as_slice().ct_eq(secret.as_slice()).into()
}

async fn refresh(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
    headers: HeaderMap,
) -> Result<Json<RefreshOutcome>, ApiError> {
    let Some(endpoint) = state.refresh.as_ref() else {
        return Err(ApiError::RefreshDisabled);
    };
    if !secret_matches(bearer(&headers), &endpoint.secret) {
        warn!("rejected refresh request");
        return Err(ApiError::Unauthorized);
    }

    let date = match query.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            DateKey::parse(raw).map_err(|_| ApiError::BadDate(raw.to_owned()))?
        }
        _ => state.selection.today(),
    };

    let outcome = endpoint.job.run(&date, flag(query.force.as_deref())).await?;
    Ok(Json(outcome))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::secret_matches;

    #[test]
    fn secret_must_match_exactly() {
        assert!(secret_matches(Some("s3cret"), "s3cret"));
        assert!(!secret_matches(Some("s3cre"), "s3cret"));
        assert!(!secret_matches(Some("s3cret!"), "s3cret"));
        assert!(!secret_matches(Some(""), "s3cret"));
        assert!(!secret_matches(None, "s3cret"));
    }
}
