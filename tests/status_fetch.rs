//! Remote Status Fetcher Tests
//!
//! The fetcher against a local HTTP server:
//! - A well-formed payload yields a reachable reading
//! - Every failure mode yields an offline reading with zero counters
//! - The admin panel overrides uptime without affecting reachability

mod support;

use std::time::{Duration, Instant};

use statusbot::status::{CfxStatusFetcher, FetcherConfig, RawServerReading, StatusSource};
use support::{silent_server, CannedServer};

const SERVER_ID: &str = "abc123";

fn fetcher(api_base: &str) -> CfxStatusFetcher {
    let config = FetcherConfig {
        api_base: api_base.to_string(),
        timeout: Duration::from_secs(2),
        ..FetcherConfig::new(SERVER_ID)
    };
    CfxStatusFetcher::new(config).unwrap()
}

async fn serve_status(status: u16, body: &'static str) -> CannedServer {
    CannedServer::start(move |_, _| (status, body.to_string())).await
}

// =============================================================================
// Success Paths
// =============================================================================

#[tokio::test]
async fn test_well_formed_payload() {
    let server = serve_status(
        200,
        r#"{"EndPoint":"abc123","Data":{"clients":12,"sv_maxclients":48,"vars":{"uptime":7260}}}"#,
    )
    .await;

    let reading = fetcher(&server.base_url).fetch().await;
    assert_eq!(reading, RawServerReading::online(12, 48, 7260));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/abc123");
    assert!(requests[0].headers.to_ascii_lowercase().contains("user-agent: statusbot/"));
}

#[tokio::test]
async fn test_lenient_numbers() {
    let server = serve_status(
        200,
        r#"{"Data":{"clients":"7","sv_maxclients":32.9,"vars":{"uptime":"abc"}}}"#,
    )
    .await;

    let reading = fetcher(&server.base_url).fetch().await;
    assert_eq!(reading, RawServerReading::online(7, 32, 0));
}

#[tokio::test]
async fn test_missing_fields_default_to_zero() {
    let server = serve_status(200, r#"{"Data":{}}"#).await;

    let reading = fetcher(&server.base_url).fetch().await;
    assert!(reading.reachable);
    assert_eq!(reading.player_count, 0);
    assert_eq!(reading.max_players, 0);
    assert_eq!(reading.uptime_seconds, 0);
}

// =============================================================================
// Failure Paths
// =============================================================================

#[tokio::test]
async fn test_http_error_is_offline() {
    let server = serve_status(500, r#"{"error":"down"}"#).await;
    assert_eq!(fetcher(&server.base_url).fetch().await, RawServerReading::offline());
}

#[tokio::test]
async fn test_non_json_body_is_offline() {
    let server = serve_status(200, "<html>maintenance</html>").await;
    assert_eq!(fetcher(&server.base_url).fetch().await, RawServerReading::offline());
}

#[tokio::test]
async fn test_missing_data_is_offline() {
    let server = serve_status(200, r#"{"error":"Server not found"}"#).await;
    assert_eq!(fetcher(&server.base_url).fetch().await, RawServerReading::offline());
}

#[tokio::test]
async fn test_connection_refused_is_offline() {
    assert_eq!(
        fetcher("http://127.0.0.1:1").fetch().await,
        RawServerReading::offline()
    );
}

#[tokio::test]
async fn test_timeout_is_bounded() {
    let base_url = silent_server().await;
    let config = FetcherConfig {
        api_base: base_url,
        timeout: Duration::from_secs(1),
        ..FetcherConfig::new(SERVER_ID)
    };
    let fetcher = CfxStatusFetcher::new(config).unwrap();

    let started = Instant::now();
    let reading = fetcher.fetch().await;

    assert_eq!(reading, RawServerReading::offline());
    assert!(started.elapsed() < Duration::from_secs(5));
}

// =============================================================================
// Alternate Uptime Source
// =============================================================================

#[tokio::test]
async fn test_admin_panel_uptime_wins() {
    let server = CannedServer::start(|_, path| match path {
        "/info.json" => (200, r#"{"vars":{"uptime":"99999"}}"#.to_string()),
        _ => (
            200,
            r#"{"Data":{"clients":1,"sv_maxclients":10,"vars":{"uptime":60}}}"#.to_string(),
        ),
    })
    .await;

    let config = FetcherConfig {
        api_base: server.base_url.clone(),
        admin_panel: Some(server.authority()),
        ..FetcherConfig::new(SERVER_ID)
    };
    let reading = CfxStatusFetcher::new(config).unwrap().fetch().await;

    assert_eq!(reading, RawServerReading::online(1, 10, 99999));
}

#[tokio::test]
async fn test_admin_panel_failure_keeps_primary() {
    let server = serve_status(
        200,
        r#"{"Data":{"clients":1,"sv_maxclients":10,"vars":{"uptime":60}}}"#,
    )
    .await;

    let config = FetcherConfig {
        api_base: server.base_url.clone(),
        admin_panel: Some(("127.0.0.1".to_string(), 1)),
        ..FetcherConfig::new(SERVER_ID)
    };
    let reading = CfxStatusFetcher::new(config).unwrap().fetch().await;

    assert_eq!(reading, RawServerReading::online(1, 10, 60));
}
