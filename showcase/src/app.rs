//! Composition root: builds every component from a [`ShowcaseConfig`].

use std::sync::Arc;

use showcase_core::SharedClock;
use showcase_moka::MokaBackend;
use showcase_redis::RedisBackend;
use tracing::{info, warn};

use crate::api::{AppState, RefreshEndpoint};
use crate::cache::ShowcaseCache;
use crate::config::ShowcaseConfig;
use crate::origin::{DisabledOrigin, OriginStore, SupabaseOrigin};
use crate::producer::DailySelection;
use crate::refresh::{CandidateSource, NoCandidates, PassthroughMirror, RefreshJob, TmdbDiscover};
use crate::resolver::DateKeyResolver;

/// Wires the service. Integrations that are unconfigured or fail to build
/// are disabled with a warning.
pub fn build(config: &ShowcaseConfig, clock: SharedClock) -> AppState {
    let resolver = Arc::new(DateKeyResolver::new(config.rollover_timezone.as_deref()));
    info!(
        timezone = resolver.timezone(),
        fallback = resolver.is_fallback(),
        "date rollover configured"
    );

    let cache = Arc::new(build_cache(config, clock.clone()));
    let origin = build_origin(config);
    let filter = config.eligibility.filter();

    let selection = Arc::new(DailySelection::new(
        resolver,
        cache,
        origin.clone(),
        filter.clone(),
        clock.clone(),
    ));

    let refresh = config.refresh.cron_secret().map(|secret| {
        let job = RefreshJob::new(origin, build_candidates(config), Arc::new(PassthroughMirror), clock)
            .filter(filter)
            .showcase_size(config.refresh.showcase_size)
            .mirror_concurrency(config.refresh.mirror_concurrency);
        Arc::new(RefreshEndpoint {
            job,
            secret: secret.to_owned(),
        })
    });
    if refresh.is_none() {
        info!("CRON_SECRET unset, refresh endpoint disabled");
    }

    AppState { selection, refresh }
}

fn build_cache(config: &ShowcaseConfig, clock: SharedClock) -> ShowcaseCache {
    let local = MokaBackend::builder(config.cache.local_capacity)
        .clock(clock.clone())
        .build();

    let remote = config.redis.credentials().and_then(|(url, token)| {
        RedisBackend::builder()
            .server(url)
            .token(token)
            .timeout(config.redis.timeout)
            .clock(clock.clone())
            .build()
            .inspect_err(|err| warn!(error = %err, "remote cache disabled"))
            .ok()
    });
    if remote.is_none() {
        info!("running with the in-process cache only");
    }

    ShowcaseCache::new(local, remote, clock)
        .local_ttl(config.cache.local_ttl)
        .remote_ttl(config.cache.remote_ttl)
        .namespace(config.cache.namespace.as_str())
        .version(config.cache.version)
}

fn build_origin(config: &ShowcaseConfig) -> Arc<dyn OriginStore> {
    let Some((url, key)) = config.supabase.credentials() else {
        warn!("origin store not configured, every cache miss reports not found");
        return Arc::new(DisabledOrigin);
    };
    match SupabaseOrigin::new(url, key, &config.supabase.table, config.supabase.timeout) {
        Ok(origin) => Arc::new(origin),
        Err(err) => {
            warn!(error = %err, "origin store disabled");
            Arc::new(DisabledOrigin)
        }
    }
}

fn build_candidates(config: &ShowcaseConfig) -> Arc<dyn CandidateSource> {
    let Some(token) = config.tmdb.token() else {
        return Arc::new(NoCandidates);
    };
    match TmdbDiscover::new(
        &config.tmdb.base_url,
        token,
        config.tmdb.pages,
        config.tmdb.timeout,
    ) {
        Ok(source) => Arc::new(source),
        Err(err) => {
            warn!(error = %err, "seeding disabled");
            Arc::new(NoCandidates)
        }
    }
}
