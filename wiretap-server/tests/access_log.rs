//! Integration tests for the access-log middleware around the demo app.
//!
//! Uses `tower::ServiceExt::oneshot` to drive the app without binding a
//! real TCP port — every test gets a fresh app and a fresh capture sink.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt; // .oneshot()
use wiretap_core::config::{AccessLogConfig, AppConfig};
use wiretap_server::server::build_app;
use wiretap_sink::MemorySink;

// ── Helpers ────────────────────────────────────────────────────

fn make_app(include_response: bool) -> (Router, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let config = AppConfig {
        access_log: AccessLogConfig {
            include_response,
            ..AccessLogConfig::default()
        },
        ..AppConfig::default()
    };
    (build_app(&config, sink.clone()), sink)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_req_with_header(uri: &str, name: &str, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ── /get/test1 ─────────────────────────────────────────────────

#[tokio::test]
async fn get_test1_returns_ok_and_records_header() {
    let (app, sink) = make_app(false);
    let resp = app
        .oneshot(get_req_with_header("/get/test1", "header-key", "header-value"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "OK");

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, 200);
    assert_eq!(records[0].method, "GET");
    assert_eq!(records[0].path, "/get/test1");
    assert_eq!(records[0].header("header-key"), Some("header-value"));
}

#[tokio::test]
async fn get_test1_with_capture_records_the_body() {
    let (app, sink) = make_app(true);
    let resp = app
        .oneshot(get_req_with_header("/get/test1", "header-key", "header-value"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "OK");
    assert_eq!(sink.records()[0].response_body.as_deref(), Some("OK"));
}

// ── /get/sleep ─────────────────────────────────────────────────

#[tokio::test]
async fn get_sleep_measures_handler_duration() {
    let (app, sink) = make_app(false);

    let start = Instant::now();
    let resp = app.oneshot(get_req("/get/sleep?time=1000")).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "1000");
    assert!(elapsed.as_millis() >= 1000, "handler returned after {elapsed:?}");

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert!(
        records[0].duration_ms >= 1000.0,
        "recorded duration {}ms, expected >= 1000ms",
        records[0].duration_ms
    );
}

// ── /get/demo ──────────────────────────────────────────────────

#[tokio::test]
async fn get_demo_returns_json_with_multi_valued_address() {
    let (app, sink) = make_app(false);
    let resp = app
        .oneshot(get_req("/get/demo?name=thomas&age=29&address=a1&address=a2"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json;charset=UTF-8"
    );
    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(json["name"], "thomas");
    assert_eq!(json["age"], 29);
    assert_eq!(json["address"], serde_json::json!(["a1", "a2"]));

    // Record carries the query pairs, repeated keys included
    let record = &sink.records()[0];
    assert!(record.query.contains(&("name".to_string(), "thomas".to_string())));
    assert!(record.query.contains(&("address".to_string(), "a1".to_string())));
    assert!(record.query.contains(&("address".to_string(), "a2".to_string())));
}

#[tokio::test]
async fn get_demo_with_capture_records_exact_response_bytes() {
    let (app, sink) = make_app(true);
    let resp = app
        .oneshot(get_req("/get/demo?name=thomas&age=29&address=a1&address=a2"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let delivered = body_string(resp).await;
    assert_eq!(sink.records()[0].response_body.as_deref(), Some(delivered.as_str()));
    assert_eq!(delivered, r#"{"name":"thomas","age":29,"address":["a1","a2"]}"#);
}

// ── Invariants ─────────────────────────────────────────────────

#[tokio::test]
async fn exactly_one_record_per_request_including_failures() {
    let (app, sink) = make_app(false);

    app.clone().oneshot(get_req("/get/test1")).await.unwrap();
    app.clone().oneshot(get_req("/get/demo?name=x&age=1&address=a")).await.unwrap();
    let resp = app.oneshot(get_req("/get/fail")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let records = sink.records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].status, 500);
}

#[tokio::test]
async fn no_body_field_without_capture() {
    let (app, sink) = make_app(false);
    app.oneshot(get_req("/get/test1")).await.unwrap();

    let record = &sink.records()[0];
    assert!(record.response_body.is_none());
    // ...and the serialized record has no such field at all
    let json: serde_json::Value = serde_json::from_str(&record.to_json_line()).unwrap();
    assert!(json.get("response_body").is_none());
}

#[tokio::test]
async fn delivered_body_is_independent_of_capture_flag() {
    let (request_app, _) = make_app(false);
    let (both_app, _) = make_app(true);
    let uri = "/get/demo?name=thomas&age=29&address=a1&address=a2";

    let plain = body_string(request_app.oneshot(get_req(uri)).await.unwrap()).await;
    let captured = body_string(both_app.oneshot(get_req(uri)).await.unwrap()).await;
    assert_eq!(plain, captured);
}

#[tokio::test]
async fn disabled_access_log_emits_nothing() {
    let sink = Arc::new(MemorySink::new());
    let config = AppConfig {
        access_log: AccessLogConfig {
            enabled: false,
            ..AccessLogConfig::default()
        },
        ..AppConfig::default()
    };
    let app = build_app(&config, sink.clone());

    let resp = app.oneshot(get_req("/get/test1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(sink.is_empty());
}
