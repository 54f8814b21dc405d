//! Integration tests for the Redis REST backend using wiremock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use showcase_backend::{Backend, BackendError, CompositionBackend, Layer};
use showcase_core::{CacheValue, Clock, DateKey, ManualClock, Raw, ShowcaseKey, ShowcaseRecord};
use showcase_moka::MokaBackend;
use showcase_redis::{Error, RedisBackend};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap())
}

fn key() -> ShowcaseKey {
    ShowcaseKey::for_date(DateKey::parse("2024-03-01").unwrap())
}

fn backend(server: &MockServer, clock: &ManualClock) -> RedisBackend {
    RedisBackend::builder()
        .server(server.uri())
        .token(TOKEN)
        .timeout(Duration::from_millis(300))
        .clock(Arc::new(clock.clone()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn read_hit_reconstructs_expiration_from_pttl() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pipeline"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!([
            ["GET", "daily-showcase:v1:2024-03-01"],
            ["PTTL", "daily-showcase:v1:2024-03-01"]
        ])))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "result": "{\"movies\":[1]}" }, { "result": 60_000 }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let value = backend(&server, &clock).read(&key()).await.unwrap().unwrap();

    assert_eq!(value.data().as_ref(), b"{\"movies\":[1]}");
    assert_eq!(value.ttl_at(clock.now()), Some(Duration::from_secs(60)));
}

#[tokio::test]
async fn huge_pttl_saturates_expiration() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pipeline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "result": "{\"movies\":[1]}" },
            { "result": 9_000_000_000_000_000_i64 }
        ])))
        .mount(&server)
        .await;

    let clock = clock();
    let value = backend(&server, &clock).read(&key()).await.unwrap().unwrap();

    assert_eq!(value.expire(), Some(chrono::DateTime::<Utc>::MAX_UTC));
    assert!(!value.is_expired_at(clock.now()));
}

#[tokio::test]
async fn read_miss_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pipeline"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "result": null }, { "result": -2 }])),
        )
        .mount(&server)
        .await;

    let clock = clock();
    assert!(backend(&server, &clock).read(&key()).await.unwrap().is_none());
}

#[tokio::test]
async fn write_sends_set_with_expiry_seconds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!([
            "SET",
            "daily-showcase:v1:2024-03-01",
            "[1,2]",
            "EX",
            93_600
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "OK" })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let value = CacheValue::expiring_in(
        Raw::from_static(b"[1,2]"),
        clock.now(),
        Duration::from_secs(93_600),
    );
    backend(&server, &clock).write(&key(), value).await.unwrap();
}

#[tokio::test]
async fn server_error_is_a_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let clock = clock();
    let result = backend(&server, &clock).read(&key()).await;
    assert!(matches!(result, Err(BackendError::ConnectionError(_))));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "result": null }, { "result": -2 }]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let clock = clock();
    let result = backend(&server, &clock).read(&key()).await;
    assert!(matches!(result, Err(BackendError::ConnectionError(_))));
}

#[tokio::test]
async fn command_error_is_an_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "WRONGPASS invalid token" })),
        )
        .mount(&server)
        .await;

    let clock = clock();
    let value = CacheValue::new(Raw::from_static(b"[]"), None);
    let result = backend(&server, &clock).write(&key(), value).await;
    assert!(matches!(result, Err(BackendError::InternalError(_))));
}

#[test]
fn build_requires_url_and_token() {
    let missing_url = RedisBackend::builder().token(TOKEN).build();
    assert!(matches!(missing_url, Err(Error::Config(_))));

    let blank_token = RedisBackend::builder()
        .server("https://example.upstash.io")
        .token("   ")
        .build();
    assert!(matches!(blank_token, Err(Error::Config(_))));
}

#[tokio::test]
async fn unreachable_remote_does_not_fail_composed_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let clock = clock();
    let shared = Arc::new(clock.clone());
    let local = MokaBackend::builder(8).clock(shared.clone()).build();
    let composed = CompositionBackend::new(local, backend(&server, &clock), shared);

    let record = ShowcaseRecord::new(
        DateKey::parse("2024-03-01").unwrap(),
        vec!["Alien".to_owned()],
        clock.now(),
    );
    composed
        .set(&key(), &record, Duration::from_secs(93_600))
        .await
        .unwrap();

    let hit = composed
        .get::<ShowcaseRecord<String>>(&key())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.layer, Layer::L1);
    assert_eq!(hit.value.into_inner(), record);
}
