//! Wiremock integration tests for the HTTP transport and the full gateway
//! flow over HTTP.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hermod::{
    ErrorKind, Hermod, HermodError, HttpTransport, QueueConfig, RetryConfig, TextGateway,
    Transport, UpstreamRequest,
};

#[tokio::test]
async fn posts_tagged_json_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_json(json!({
            "type": "translate",
            "text": "你好",
            "targetLang": "en",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "translated": "Hello" })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(format!("{}/api", server.uri())).unwrap();
    let body = transport
        .request(&UpstreamRequest::Translate {
            text: "你好".into(),
            target_lang: "en".into(),
        })
        .await
        .unwrap();
    assert_eq!(body["translated"], "Hello");
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri()).unwrap();
    let err = transport
        .request(&UpstreamRequest::TrendingTopics)
        .await
        .unwrap_err();
    match &err {
        HermodError::Api { status, message } => {
            assert_eq!(*status, 502);
            assert_eq!(message, "bad gateway");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn client_error_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("missing prompt"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri()).unwrap();
    let err = transport
        .request(&UpstreamRequest::CultureExplanation { prompt: String::new() })
        .await
        .unwrap_err();
    assert!(!err.is_transient());
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn long_error_body_is_truncated_on_char_boundary() {
    let server = MockServer::start().await;
    // 3-byte characters; 512 is not a multiple of 3
    let body: String = std::iter::repeat_n('错', 400).collect();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri()).unwrap();
    match transport.request(&UpstreamRequest::TrendingTopics).await {
        Err(HermodError::Api { message, .. }) => {
            assert!(message.len() <= 512);
            assert_eq!(message.chars().count(), 170);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_body_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri()).unwrap();
    let err = transport
        .request(&UpstreamRequest::TrendingTopics)
        .await
        .unwrap_err();
    assert!(matches!(err, HermodError::Json(_)));
}

#[tokio::test]
async fn timeout_is_transient_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let transport =
        HttpTransport::with_timeout(server.uri(), Duration::from_millis(50)).unwrap();
    let err = transport
        .request(&UpstreamRequest::TrendingTopics)
        .await
        .unwrap_err();
    assert!(matches!(err, HermodError::Http(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn gateway_retries_over_http_then_serves_from_cache() {
    let server = MockServer::start().await;
    // first call fails, the rest succeed
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "type": "translate" })))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "type": "translate" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "translated": "Hello" })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Hermod::builder()
        .endpoint(server.uri())
        .queue(
            QueueConfig::new()
                .retry(RetryConfig::new().delays([Duration::from_millis(10)]))
                .drain_pause(Duration::ZERO),
        )
        .without_sweeper()
        .build()
        .await
        .unwrap();

    assert_eq!(gateway.translate("你好", "en").await.unwrap().translated, "Hello");
    assert_eq!(gateway.translate("你好", "en").await.unwrap().translated, "Hello");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn feedback_is_posted_directly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({ "type": "feedback", "feedback": "love it" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Hermod::builder()
        .endpoint(server.uri())
        .without_sweeper()
        .build()
        .await
        .unwrap();
    gateway.submit_feedback("love it").await.unwrap();
    assert!(gateway.stats().recent_history.is_empty());
}
