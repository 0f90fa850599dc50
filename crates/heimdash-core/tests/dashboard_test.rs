#![allow(clippy::unwrap_used)]
// Integration tests for the Dashboard facade using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use heimdash_api::{BridgeEndpoint, TransportConfig};
use heimdash_core::{
    CalendarConfig, Dashboard, DashboardConfig, LightsConfig, StationboardConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn route(server: &MockServer, suffix: &str) -> Url {
    Url::parse(&format!("{}{suffix}", server.uri())).unwrap()
}

/// Config with every upstream pointed at the mock server and the bridge
/// fallback set to the mock server's authority, so lighting fetches hit
/// the mocks too.
fn config(server: &MockServer) -> DashboardConfig {
    DashboardConfig {
        transport: TransportConfig::default(),
        stationboard: StationboardConfig {
            api_url: route(server, "/stationboard"),
            station: "Wetlistrasse".into(),
            limit: 5,
            poll_interval: Duration::from_secs(3600),
        },
        lights: LightsConfig {
            user: "hue-user-token".to_string().into(),
            fallback_address: server.uri().trim_start_matches("http://").to_owned(),
            discovery_url: route(server, "/discovery"),
            discovery_interval: Duration::from_secs(3600),
            poll_interval: Duration::from_secs(3600),
            settle_delay: Duration::from_millis(50),
        },
        calendar: CalendarConfig {
            erz_url: route(server, "/calendar.json"),
            pickup_url: route(server, "/pickup"),
            zip: "8004".into(),
            pickup_type: "Monthly".into(),
            fetch_limit: 10,
            entry_limit: 3,
            poll_interval: Duration::from_secs(3600),
        },
    }
}

async fn mount_stationboard(server: &MockServer, departures: usize) {
    let board: Vec<_> = (0..departures)
        .map(|i| json!({ "category": "B", "number": i.to_string() }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/stationboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "station": { "name": "Wetlistrasse" },
            "stationboard": board
        })))
        .mount(server)
        .await;
}

async fn mount_groups(server: &MockServer, on: bool) {
    Mock::given(method("GET"))
        .and(path("/api/hue-user-token/groups/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "1": { "name": "Living room", "action": { "on": on } }
        })))
        .mount(server)
        .await;
}

// ── Empty defaults ──────────────────────────────────────────────────

#[tokio::test]
async fn snapshots_have_empty_defaults_before_first_fetch() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();

    assert!(dashboard.stationboard().stationboard.is_empty());
    assert!(dashboard.groups().is_empty());
    let calendar = dashboard.calendar();
    assert!(calendar.cardboard.is_empty());
    assert!(calendar.paper.is_empty());
    assert!(calendar.mrgreen.is_empty());
}

// ── Refresh retention ───────────────────────────────────────────────

#[tokio::test]
async fn failed_refresh_retains_previous_snapshot() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();

    // First cycle succeeds...
    Mock::given(method("GET"))
        .and(path("/stationboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "station": { "name": "Wetlistrasse" },
            "stationboard": [{ "number": "33" }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // ...then the upstream starts failing.
    Mock::given(method("GET"))
        .and(path("/stationboard"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    dashboard.refresh_stationboard().await;
    assert_eq!(dashboard.stationboard().stationboard.len(), 1);

    dashboard.refresh_stationboard().await;
    // Still the value from the successful fetch.
    assert_eq!(dashboard.stationboard().stationboard.len(), 1);
}

// ── Bridge discovery & fallback ─────────────────────────────────────

#[tokio::test]
async fn discovery_failure_keeps_fallback_and_lighting_fetches_target_it() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();
    let fallback = BridgeEndpoint::new(server.uri().trim_start_matches("http://"));

    Mock::given(method("GET"))
        .and(path("/discovery"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;
    mount_groups(&server, true).await;

    dashboard.refresh_bridge().await;
    assert_eq!(*dashboard.bridge_endpoint(), fallback);

    // Group fetches succeed against the fallback address.
    dashboard.refresh_groups().await;
    assert!(dashboard.groups()["1"].action.on);
}

#[tokio::test]
async fn successful_discovery_replaces_endpoint() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();

    Mock::given(method("GET"))
        .and(path("/discovery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "internalipaddress": "192.168.1.42" }
        ])))
        .mount(&server)
        .await;

    dashboard.refresh_bridge().await;
    assert_eq!(*dashboard.bridge_endpoint(), BridgeEndpoint::new("192.168.1.42"));
}

#[tokio::test]
async fn discovery_failure_after_success_reverts_to_fallback() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();
    let fallback = BridgeEndpoint::new(server.uri().trim_start_matches("http://"));

    // One good discovery, then the service starts rejecting.
    Mock::given(method("GET"))
        .and(path("/discovery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "internalipaddress": "192.168.1.42" }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/discovery"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    dashboard.refresh_bridge().await;
    assert_eq!(*dashboard.bridge_endpoint(), BridgeEndpoint::new("192.168.1.42"));

    dashboard.refresh_bridge().await;
    assert_eq!(*dashboard.bridge_endpoint(), fallback);
}

// ── Light trigger & convergence ─────────────────────────────────────

#[tokio::test]
async fn trigger_light_passes_ack_through_and_converges() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();

    let ack = json!([{ "success": { "/groups/1/action/on": true } }]);
    Mock::given(method("PUT"))
        .and(path("/api/hue-user-token/groups/1/action/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ack))
        .expect(1)
        .mount(&server)
        .await;
    mount_groups(&server, true).await;

    let body = dashboard.trigger_light("1", true).await.unwrap();
    assert_eq!(body, ack);

    // The convergence future resolves after the settle delay with the
    // groups snapshot re-read.
    dashboard.settled().await;
    assert!(dashboard.groups()["1"].action.on);
}

#[tokio::test]
async fn settled_resolves_immediately_when_no_write_is_pending() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();

    // No trigger has happened — must not block.
    tokio::time::timeout(Duration::from_millis(10), dashboard.settled())
        .await
        .expect("settled() should resolve immediately");
}

#[tokio::test]
async fn second_trigger_supersedes_pending_convergence() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/hue-user-token/groups/1/action/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;
    mount_groups(&server, false).await;

    dashboard.trigger_light("1", true).await.unwrap();
    let first = dashboard.settled();
    dashboard.trigger_light("1", false).await.unwrap();
    let latest = dashboard.settled();

    // The latest token covers the second write's re-read; the first one
    // still completes on its own (superseded, not cancelled).
    latest.await;
    assert!(!dashboard.groups()["1"].action.on);
    tokio::time::timeout(Duration::from_secs(1), first)
        .await
        .expect("superseded convergence still runs to completion");

    // After convergence, a fresh settle token resolves immediately.
    tokio::time::timeout(Duration::from_millis(10), dashboard.settled())
        .await
        .expect("settled() is ready once convergence finished");
}

#[tokio::test]
async fn convergence_reread_failure_is_swallowed() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/hue-user-token/groups/1/action/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/hue-user-token/groups/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    // The write succeeded, so the trigger itself is Ok — and the failed
    // re-read only logs, leaving the empty default snapshot in place.
    dashboard.trigger_light("1", true).await.unwrap();
    dashboard.settled().await;
    assert!(dashboard.groups().is_empty());
}

#[tokio::test]
async fn trigger_light_transport_failure_is_surfaced() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/hue-user-token/groups/1/action/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let result = dashboard.trigger_light("1", true).await;
    assert!(result.is_err(), "expected surfaced error, got: {result:?}");
}

// ── Startup & shutdown ──────────────────────────────────────────────

#[tokio::test]
async fn start_populates_all_snapshots_before_returning() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server)).unwrap();

    Mock::given(method("GET"))
        .and(path("/discovery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "internalipaddress": server.uri().trim_start_matches("http://") }
        ])))
        .mount(&server)
        .await;
    mount_stationboard(&server, 3).await;
    mount_groups(&server, true).await;
    Mock::given(method("GET"))
        .and(path("/calendar.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "date": "2025-01-07", "waste_type": "paper" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pickup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dates_data": [{ "date": ["5. Januar 2025"] }]
        })))
        .mount(&server)
        .await;

    dashboard.start().await;

    assert_eq!(dashboard.stationboard().stationboard.len(), 3);
    assert!(!dashboard.groups().is_empty());
    assert_eq!(dashboard.calendar().paper.len(), 1);
    assert_eq!(
        dashboard.calendar().mrgreen,
        vec!["2025-01-05".parse().unwrap()]
    );

    dashboard.shutdown().await;
}
