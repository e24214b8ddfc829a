//! Tests for configuration file loading and builder wiring.

mod common;

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use common::{MockTransport, manual_clock};
use hermod::{Config, ErrorKind, HermodBuilder, HermodError, QueueConfig, TextGateway};

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn explicit_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[transport]
endpoint = "https://proxy.example.com/api"
timeout_secs = 5

[limits]
max_requests_per_minute = 20
max_input_chars = 200

[cache]
trending_ttl_secs = 600

[retry]
max_attempts = 4
delays_ms = [500, 1000, 2000]

[ledger]
max_history = 50
recent_history = 5

[storage]
state_path = "/var/lib/hermod/state.json"
"#,
    );

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.transport.endpoint, "https://proxy.example.com/api");
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.limits.max_requests_per_minute, 20);
    assert_eq!(config.limits.max_daily_tokens, 100_000);
    assert_eq!(config.limits.max_input_chars, 200);

    let retry = config.retry_config();
    assert_eq!(retry.max_attempts, 4);
    assert_eq!(retry.total_backoff(), Duration::from_millis(3500));

    assert_eq!(config.cache_config().max_ttl(), Duration::from_secs(7 * 24 * 3600));
    assert_eq!(
        config.state_path().unwrap(),
        std::path::PathBuf::from("/var/lib/hermod/state.json")
    );
}

#[test]
fn missing_explicit_file_is_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn malformed_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[limits]\nmax_requests_per_minute = \"many\"\n");

    match Config::load(Some(&path)) {
        Err(HermodError::Configuration(msg)) => assert!(msg.contains("config.toml")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn empty_endpoint_rejected() {
    let err = Config::from_toml_str("[transport]\nendpoint = \"  \"\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn builder_applies_configured_limits() {
    let config = Config::from_toml_str(
        "[limits]\nmax_requests_per_minute = 1\nmax_input_chars = 3\n",
    )
    .unwrap();
    let transport = MockTransport::ok(json!({ "translated": "ok" }));

    let gateway = HermodBuilder::from_config(&config)
        .transport(transport.clone())
        .clock(manual_clock())
        .queue(QueueConfig::new().drain_pause(Duration::ZERO))
        .without_sweeper()
        .build()
        .await
        .unwrap();

    let err = gateway.translate("四个字符", "en").await.unwrap_err();
    assert!(matches!(err, HermodError::InputTooLong { limit: 3, .. }));

    gateway.translate("一", "en").await.unwrap();
    let err = gateway.translate("二", "en").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
    assert_eq!(transport.calls(), 1);
}
