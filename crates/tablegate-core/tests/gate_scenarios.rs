//! End-to-end gate behavior against a mock backend.

use std::sync::Arc;

use serde_json::json;
use tablegate_cache::{CacheConfig, CacheKey, CacheStore, ONE_HOUR_MILLIS};
use tablegate_client::{GateClient, Restaurant, ScrapeResponse};
use tablegate_core::{
    Admission, DataViewController, FetchError, GuardState, ManualClock, RouteGuard,
    SessionOracle, SessionState,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NOW: i64 = 1_700_000_000_000;
const MINUTE: i64 = 60_000;

fn client_for(server: &MockServer) -> GateClient {
    GateClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .build()
        .unwrap()
}

fn listing_body() -> serde_json::Value {
    json!({
        "success": true,
        "restaurants": [
            {"title": "Noodle Bar", "description": "Hand-pulled noodles", "price": "$$"},
            {"title": "Taqueria", "image": "https://img.example.com/t.jpg"}
        ]
    })
}

async fn mount_scrape(server: &MockServer, body: serde_json::Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn view_at(
    server: &MockServer,
    cache: &CacheStore,
    now: i64,
) -> (DataViewController<GateClient>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now));
    let view = DataViewController::new(client_for(server), cache.clone(), &CacheConfig::default())
        .with_clock(clock.clone());
    (view, clock)
}

fn seeded_cache(fetched_at: i64) -> CacheStore {
    let cache = CacheStore::in_memory();
    let cached = ScrapeResponse {
        success: true,
        restaurants: vec![Restaurant::new("Cached Diner")],
        error: None,
    };
    cache.write(&CacheKey::new("restaurantData"), &cached, fetched_at);
    cache
}

#[tokio::test]
async fn test_scenario_a_cold_cache_fetch() {
    let server = MockServer::start().await;
    mount_scrape(&server, listing_body(), 1).await;

    let cache = CacheStore::in_memory();
    let (view, _clock) = view_at(&server, &cache, NOW);

    let data = view.load_dataset(false).await.unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].title, "Noodle Bar");
    assert_eq!(data[1].price_label(), "Price not specified");

    let entry = cache.read::<ScrapeResponse>(view.key()).unwrap();
    assert!(entry.value.success);
    assert_eq!(entry.value.restaurants, data);
    assert!(entry.is_fresh(ONE_HOUR_MILLIS, NOW));
    assert_eq!(
        cache.slots().get("restaurantDataTimestamp").unwrap(),
        Some(NOW.to_string())
    );
}

#[tokio::test]
async fn test_scenario_b_fresh_cache_no_network() {
    let server = MockServer::start().await;
    mount_scrape(&server, listing_body(), 0).await;

    let cache = seeded_cache(NOW - 30 * MINUTE);
    let (view, _clock) = view_at(&server, &cache, NOW);

    let data = view.load_dataset(false).await.unwrap();
    assert_eq!(data[0].title, "Cached Diner");
}

#[tokio::test]
async fn test_scenario_c_stale_cache_refetches() {
    let server = MockServer::start().await;
    mount_scrape(&server, listing_body(), 1).await;

    let cache = seeded_cache(NOW - 90 * MINUTE);
    let (view, _clock) = view_at(&server, &cache, NOW);

    let data = view.load_dataset(false).await.unwrap();
    assert_eq!(data[0].title, "Noodle Bar");
    assert_eq!(cache.fetched_at(view.key()), Some(NOW));
}

#[tokio::test]
async fn test_scenario_d_service_error_leaves_cache() {
    let server = MockServer::start().await;
    mount_scrape(&server, json!({"success": false, "error": "rate limited"}), 1).await;

    let stale_at = NOW - 90 * MINUTE;
    let cache = seeded_cache(stale_at);
    let (view, _clock) = view_at(&server, &cache, NOW);

    let err = view.load_dataset(false).await.unwrap_err();
    assert_eq!(err, FetchError::Service("rate limited".to_string()));

    let entry = view.cached_listing().unwrap();
    assert_eq!(entry.fetched_at, stale_at);
    assert_eq!(entry.value[0].title, "Cached Diner");
}

#[tokio::test]
async fn test_null_fields_in_listing_are_loaded() {
    let server = MockServer::start().await;
    mount_scrape(
        &server,
        json!({
            "success": true,
            "restaurants": [
                {"title": "Noodle Bar", "description": null, "price": null, "image": null},
                {"description": "Untitled stall"}
            ]
        }),
        1,
    )
    .await;

    let cache = CacheStore::in_memory();
    let (view, _clock) = view_at(&server, &cache, NOW);

    let data = view.load_dataset(false).await.unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].price_label(), "Price not specified");
    assert_eq!(data[0].description_label(), tablegate_client::DESCRIPTION_FALLBACK);
    assert_eq!(data[1].title, "");
    assert_eq!(view.cached_listing().unwrap().value, data);
}

#[tokio::test]
async fn test_scenario_e_server_error_denies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/check-auth"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = SessionOracle::new(client_for(&server));
    let guard = RouteGuard::new("/");
    assert_eq!(guard.state(), GuardState::Checking);

    let mut rendered = false;
    let admission = guard
        .protect(&oracle, || {
            rendered = true;
        })
        .await;

    assert_eq!(oracle.state(), SessionState::Unauthenticated);
    assert_eq!(guard.state(), GuardState::Denied);
    assert_eq!(admission, Admission::Redirect("/".to_string()));
    assert!(!rendered);
}

#[tokio::test]
async fn test_authenticated_visitor_is_admitted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/check-auth"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"authenticated": true, "user": {"email": "diner@example.com"}})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let oracle = SessionOracle::new(client_for(&server));
    let guard = RouteGuard::new("/");

    let admission = guard.protect(&oracle, || "listing").await;
    assert_eq!(admission, Admission::Render("listing"));

    // Re-entering the route queries the server again.
    assert_eq!(guard.enter(&oracle).await, GuardState::Admitted);
}

#[tokio::test]
async fn test_forced_refresh_failure_clears_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let cache = seeded_cache(NOW - MINUTE);
    let (view, _clock) = view_at(&server, &cache, NOW);

    let err = view.load_dataset(true).await.unwrap_err();
    assert_eq!(err.reason(), "HTTP error! Status: 503");
    assert!(view.cached_listing().is_none());
    assert_eq!(cache.slots().get("restaurantData").unwrap(), None);
}

#[tokio::test]
async fn test_repeat_loads_within_ttl_make_one_call() {
    let server = MockServer::start().await;
    mount_scrape(&server, listing_body(), 1).await;

    let cache = CacheStore::in_memory();
    let (view, clock) = view_at(&server, &cache, NOW);

    view.load_dataset(false).await.unwrap();
    clock.advance(59 * MINUTE);
    view.load_dataset(false).await.unwrap();

    // A second view over the same cache also reads the entry.
    let (other, _clock) = view_at(&server, &cache, NOW + 10 * MINUTE);
    assert_eq!(other.load_dataset(false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_corrupt_cache_forces_fetch() {
    let server = MockServer::start().await;
    mount_scrape(&server, listing_body(), 1).await;

    let cache = CacheStore::in_memory();
    cache.slots().set("restaurantData", "[{\"title\":").unwrap();
    cache.slots().set("restaurantDataTimestamp", &NOW.to_string()).unwrap();
    let (view, _clock) = view_at(&server, &cache, NOW);

    assert_eq!(view.load_dataset(false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unreachable_server() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = GateClient::builder()
        .base_url(format!("{}/api", uri))
        .build()
        .unwrap();

    let oracle = SessionOracle::new(client.clone());
    assert!(oracle.check().await.is_unverifiable());
    assert_eq!(oracle.state(), SessionState::Unauthenticated);

    let view = DataViewController::new(client, CacheStore::in_memory(), &CacheConfig::default());
    let err = view.load_dataset(false).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
    assert!(!err.reason().is_empty());
}
