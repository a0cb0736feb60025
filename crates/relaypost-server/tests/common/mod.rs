#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use relaypost_server::app;
use relaypost_server::config::{SeedRecipient, ServerConfig};
use relaypost_server::state::{build_state, AppState};
use serde_json::Value;
use tower::util::ServiceExt;

pub struct TestContext {
    pub state: AppState,
    pub app: axum::Router,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        recipients: vec![
            SeedRecipient {
                role: "retailer".to_string(),
                id: "r-100".to_string(),
                name: "Velvet Vine".to_string(),
                email: Some("owner@velvetvine.example".to_string()),
                phone: Some("+15550002222".to_string()),
                device_token: None,
            },
            SeedRecipient {
                role: "customer".to_string(),
                id: "c-200".to_string(),
                name: "Asha Rao".to_string(),
                email: Some("asha@example.com".to_string()),
                phone: None,
                device_token: Some("tok-asha-1".to_string()),
            },
            SeedRecipient {
                role: "admin".to_string(),
                id: "a-1".to_string(),
                name: "Platform Ops".to_string(),
                email: Some("ops@trendpin.example".to_string()),
                phone: None,
                device_token: None,
            },
        ],
        ..ServerConfig::default()
    }
}

pub fn build_test_context() -> TestContext {
    build_test_context_with(test_config())
}

pub fn build_test_context_with(config: ServerConfig) -> TestContext {
    let state = build_state(config);
    let app = app::build_http_app(state.clone());
    TestContext { state, app }
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let req_body = body.unwrap_or(Value::Null).to_string();
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(req_body))
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["err_code"], 0);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
    assert!(json.get("data").is_some());
    assert!(json["data"].is_null());
}

pub fn smtp_bundle() -> Value {
    serde_json::json!({
        "host": "smtp.example.com",
        "port": 587,
        "username": "mailer",
        "password": "hunter2",
        "encryption": "tls",
        "from_address": "noreply@trendpin.example",
        "from_name": "TrendPin",
    })
}

pub fn generic_sms_bundle(gateway_url: &str) -> Value {
    serde_json::json!({
        "provider": "generic",
        "gateway_url": gateway_url,
    })
}
