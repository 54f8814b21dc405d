//! Service configuration.
//!
//! Settings are read from an optional YAML file named by `SHOWCASE_CONFIG`,
//! then overridden by environment variables. Blank values count as unset, and
//! every external integration whose credentials are unset is disabled rather
//! than failing startup.
//!
//! ```yaml
//! bind: 0.0.0.0:8080
//! rollover_timezone: Europe/Berlin
//! cache:
//!   local_ttl: 5m
//!   remote_ttl: 26h
//!   local_capacity: 64
//! redis:
//!   url: https://eu1-example.upstash.io
//!   token: secret
//!   timeout: 2s
//! eligibility:
//!   min_rating: 6.5
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::movie::{DOCUMENTARY_GENRE_ID, EligibilityFilter};
use crate::origin::DEFAULT_TABLE;
use crate::refresh::{DEFAULT_SHOWCASE_SIZE, DEFAULT_TMDB_URL};

pub const CONFIG_PATH_VAR: &str = "SHOWCASE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_saphyr::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub bind: String,
    /// IANA zone the showcase rotates in. Unset or blank selects the default.
    pub rollover_timezone: Option<String>,
    pub cache: CacheConfig,
    pub redis: RedisConfig,
    pub supabase: SupabaseConfig,
    pub tmdb: TmdbConfig,
    pub eligibility: EligibilityConfig,
    pub refresh: RefreshConfig,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_owned(),
            rollover_timezone: None,
            cache: CacheConfig::default(),
            redis: RedisConfig::default(),
            supabase: SupabaseConfig::default(),
            tmdb: TmdbConfig::default(),
            eligibility: EligibilityConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(with = "humantime_serde")]
    pub local_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub remote_ttl: Duration,
    /// Maximum number of days held in process memory.
    pub local_capacity: u64,
    pub namespace: String,
    pub version: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            local_ttl: showcase_backend::composition::DEFAULT_L1_TTL,
            remote_ttl: crate::cache::DEFAULT_REMOTE_TTL,
            local_capacity: 64,
            namespace: showcase_core::key::DEFAULT_NAMESPACE.to_owned(),
            version: showcase_core::key::RECORD_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout: Duration::from_secs(2),
        }
    }
}

impl RedisConfig {
    /// Returns `(url, token)` if both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((present(&self.url)?, present(&self.token)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub table: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            table: DEFAULT_TABLE.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl SupabaseConfig {
    /// Returns `(url, service_key)` if both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((present(&self.url)?, present(&self.service_key)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub pages: u32,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_TMDB_URL.to_owned(),
            pages: 3,
            timeout: Duration::from_secs(10),
        }
    }
}

impl TmdbConfig {
    pub fn token(&self) -> Option<&str> {
        present(&self.token)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub min_rating: f64,
    pub excluded_genres: Vec<String>,
    pub excluded_genre_ids: Vec<u32>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_rating: 6.0,
            excluded_genres: vec!["documentary".to_owned()],
            excluded_genre_ids: vec![DOCUMENTARY_GENRE_ID],
        }
    }
}

impl EligibilityConfig {
    pub fn filter(&self) -> EligibilityFilter {
        EligibilityFilter {
            min_rating: self.min_rating,
            excluded_genres: self
                .excluded_genres
                .iter()
                .map(|genre| genre.trim().to_lowercase())
                .collect(),
            excluded_genre_ids: self.excluded_genre_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Bearer secret of the refresh endpoint. Unset disables the endpoint.
    pub cron_secret: Option<String>,
    pub showcase_size: usize,
    pub mirror_concurrency: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            cron_secret: None,
            showcase_size: DEFAULT_SHOWCASE_SIZE,
            mirror_concurrency: 4,
        }
    }
}

impl RefreshConfig {
    pub fn cron_secret(&self) -> Option<&str> {
        present(&self.cron_secret)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ShowcaseConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_saphyr::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Loads the file named by `SHOWCASE_CONFIG` (if any) and applies the
    /// process environment on top.
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();
        let config = match lookup(CONFIG_PATH_VAR).filter(|path| !path.trim().is_empty()) {
            Some(path) => Self::from_file(path.trim())?,
            None => Self::default(),
        };
        Ok(config.with_env(lookup))
    }

    /// Applies environment overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        if let Some(bind) = var("SHOWCASE_BIND") {
            self.bind = bind;
        }
        if let Some(zone) = var("DAILY_ROLLOVER_TIMEZONE") {
            self.rollover_timezone = Some(zone);
        }
        if let Some(url) = var("UPSTASH_REDIS_REST_URL") {
            self.redis.url = Some(url);
        }
        if let Some(token) = var("UPSTASH_REDIS_REST_TOKEN") {
            self.redis.token = Some(token);
        }
        if let Some(url) = var("SUPABASE_URL") {
            self.supabase.url = Some(url);
        }
        if let Some(key) = var("SUPABASE_SERVICE_ROLE_KEY") {
            self.supabase.service_key = Some(key);
        }
        if let Some(token) = var("TMDB_API_KEY") {
            self.tmdb.token = Some(token);
        }
        if let Some(secret) = var("CRON_SECRET") {
            self.refresh.cron_secret = Some(secret);
        }
        self
    }
}
