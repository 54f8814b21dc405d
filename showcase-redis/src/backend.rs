//! Redis REST backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use showcase_backend::{Backend, BackendResult};
use showcase_core::{BackendLabel, CacheValue, Raw, SharedClock, ShowcaseKey, SystemClock};
use tracing::trace;

use crate::error::Error;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// One element of a REST reply: either `{"result": ...}` or `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl Reply {
    fn into_result(self) -> Result<Value, Error> {
        match self.error {
            Some(message) => Err(Error::Command(message)),
            None => Ok(self.result),
        }
    }
}

/// Shared cache tier over the Redis REST protocol.
///
/// Each call is a single HTTPS request with its own timeout. A timed-out or
/// failed call surfaces as a [`BackendError`](showcase_backend::BackendError);
/// callers on the read path treat it as a miss.
#[derive(Clone)]
pub struct RedisBackend {
    client: reqwest::Client,
    base_url: String,
    token: String,
    clock: SharedClock,
    label: BackendLabel,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("label", &self.label)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RedisBackend {
    /// Creates new RedisBackend builder with default settings.
    #[must_use]
    pub fn builder() -> RedisBackendBuilder {
        RedisBackendBuilder::default()
    }

    async fn command<T>(&self, path: &str, body: &T) -> Result<Value, Error>
    where
        T: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body: body.chars().take(256).collect(),
            });
        }
        Ok(response.json::<Value>().await?)
    }

    async fn pipeline(&self, commands: Value) -> Result<Vec<Reply>, Error> {
        let reply = self.command("/pipeline", &commands).await?;
        serde_json::from_value(reply).map_err(|err| Error::Reply(err.to_string()))
    }

    async fn single(&self, command: Value) -> Result<Value, Error> {
        let reply = self.command("", &command).await?;
        let reply: Reply =
            serde_json::from_value(reply).map_err(|err| Error::Reply(err.to_string()))?;
        reply.into_result()
    }
}

/// Part of builder pattern implementation for RedisBackend.
pub struct RedisBackendBuilder {
    base_url: Option<String>,
    token: Option<String>,
    timeout: Duration,
    clock: SharedClock,
    label: BackendLabel,
}

impl Default for RedisBackendBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            clock: SystemClock::shared(),
            label: BackendLabel::new_static("redis"),
        }
    }
}

impl RedisBackendBuilder {
    /// Set the REST endpoint, e.g. `https://eu1-example.upstash.io`.
    pub fn server(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-request timeout. A timed-out call is an error, never a hang.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the clock used to turn `PTTL` into an absolute expiration.
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Set a custom label for this backend.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Create new instance of the Redis REST backend with passed settings.
    pub fn build(self) -> Result<RedisBackend, Error> {
        let base_url = self
            .base_url
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Config("missing REST URL".to_owned()))?;
        let token = self
            .token
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Config("missing REST token".to_owned()))?;
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(RedisBackend {
            client,
            base_url,
            token,
            clock: self.clock,
            label: self.label,
        })
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn read(&self, key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>> {
        let cache_key = key.to_string();
        trace!(key = %cache_key, "GET + PTTL");

        let mut replies = self
            .pipeline(json!([["GET", cache_key], ["PTTL", cache_key]]))
            .await?
            .into_iter();
        let (Some(data), Some(pttl)) = (replies.next(), replies.next()) else {
            return Err(Error::Reply("expected two pipeline replies".to_owned()).into());
        };

        let data = match data.into_result()? {
            Value::Null => return Ok(None),
            Value::String(data) => Bytes::from(data.into_bytes()),
            other => return Err(Error::Reply(format!("GET returned {other}")).into()),
        };

        // PTTL: -2 if the key vanished in between, -1 if it has no TTL, else milliseconds.
        let pttl = pttl.into_result()?.as_i64().unwrap_or(-1);
        if pttl == -2 {
            return Ok(None);
        }
        let expire = (pttl > 0).then(|| {
            TimeDelta::try_milliseconds(pttl)
                .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        Ok(Some(CacheValue::new(data, expire)))
    }

    async fn write(&self, key: &ShowcaseKey, value: CacheValue<Raw>) -> BackendResult<()> {
        let cache_key = key.to_string();
        let now = self.clock.now();
        let ttl = value.ttl_at(now);
        if value.expire().is_some() && ttl.is_none() {
            trace!(key = %cache_key, "skipping write of already expired value");
            return Ok(());
        }

        let (_, data) = value.into_parts();
        let data = String::from_utf8(data.to_vec()).map_err(|_| Error::NonUtf8Value)?;

        let command = match ttl {
            // EX takes whole seconds; round up so a sub-second TTL still lands.
            Some(ttl) => {
                let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
                json!(["SET", cache_key, data, "EX", secs.max(1)])
            }
            None => json!(["SET", cache_key, data]),
        };
        trace!(key = %key, "SET");
        self.single(command).await?;
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }
}
