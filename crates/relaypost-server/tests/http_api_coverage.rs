mod common;

use axum::http::StatusCode;
use common::*;
use relaypost_notify::dispatcher::{MISSING_TEMPLATE, NOT_CONFIGURED, PROVIDER_ERROR};
use relaypost_notify::tester::CONNECTION_FAILED;
use serde_json::json;

#[tokio::test]
async fn health_returns_envelope_with_trace_id() {
    let ctx = build_test_context();
    let (status, body, trace_id) = request_no_body(&ctx.app, "GET", "/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert!(trace_id.is_some());
    assert_eq!(body["data"]["event_count"], 8);
    assert_eq!(body["data"]["template_count"], 8);
}

#[tokio::test]
async fn get_config_returns_seeded_catalog() {
    let ctx = build_test_context();
    let (status, body, _) = request_no_body(&ctx.app, "GET", "/v1/notifications/config").await;

    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);

    let events = body["data"]["events"].as_array().unwrap();
    let approved = events
        .iter()
        .find(|e| e["id"] == "retailer_approved")
        .expect("retailer_approved should be seeded");
    assert_eq!(approved["enabled"], true);
    assert_eq!(approved["channels"]["email"], true);
    assert_eq!(approved["channels"].as_object().unwrap().len(), 4);
    assert!(approved["recipients"]
        .as_array()
        .unwrap()
        .contains(&json!("retailer")));

    let templates = body["data"]["templates"].as_array().unwrap();
    let tpl = templates
        .iter()
        .find(|t| t["event_id"] == "retailer_approved")
        .expect("template should be seeded");
    let rows = tpl["contents"].as_array().unwrap();
    // Normalized table: every role × channel leaf is present.
    assert_eq!(rows.len(), 12);
    let subject = rows
        .iter()
        .find(|r| r["role"] == "retailer" && r["channel"] == "email")
        .and_then(|r| r["subject"].as_str())
        .unwrap();
    assert_eq!(
        subject,
        "Congratulations! Your {{app_name}} Retailer Account is Approved"
    );
}

#[tokio::test]
async fn toggle_event_twice_restores_state() {
    let ctx = build_test_context();
    let uri = "/v1/notifications/config/events/retailer_approved/toggle";

    let (status, body, _) = request_no_body(&ctx.app, "POST", uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], false);
    // Recipient/channel state survives the disable.
    assert_eq!(body["data"]["channels"]["email"], true);

    let (_, body, _) = request_no_body(&ctx.app, "POST", uri).await;
    assert_eq!(body["data"]["enabled"], true);
}

#[tokio::test]
async fn toggle_channel_and_recipient_roundtrip() {
    let ctx = build_test_context();

    let ch_uri = "/v1/notifications/config/events/retailer_approved/channels/push/toggle";
    let (_, body, _) = request_no_body(&ctx.app, "POST", ch_uri).await;
    assert_eq!(body["data"]["channels"]["push"], true);
    let (_, body, _) = request_no_body(&ctx.app, "POST", ch_uri).await;
    assert_eq!(body["data"]["channels"]["push"], false);

    let rc_uri = "/v1/notifications/config/events/retailer_approved/recipients/admin/toggle";
    let (_, body, _) = request_no_body(&ctx.app, "POST", rc_uri).await;
    assert!(body["data"]["recipients"]
        .as_array()
        .unwrap()
        .contains(&json!("admin")));
    let (_, body, _) = request_no_body(&ctx.app, "POST", rc_uri).await;
    assert!(!body["data"]["recipients"]
        .as_array()
        .unwrap()
        .contains(&json!("admin")));
}

#[tokio::test]
async fn toggle_rejects_unknown_channel_and_event() {
    let ctx = build_test_context();

    let (status, body, _) = request_no_body(
        &ctx.app,
        "POST",
        "/v1/notifications/config/events/retailer_approved/channels/telegram/toggle",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1101);

    let (status, body, _) = request_no_body(
        &ctx.app,
        "POST",
        "/v1/notifications/config/events/retailer_banned/toggle",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn template_field_update_touches_one_leaf() {
    let ctx = build_test_context();

    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        "/v1/notifications/config/templates/tpl_retailer_approved",
        Some(json!({
            "role": "customer",
            "channel": "email",
            "field": "subject",
            "value": "Hello {{app_name}}",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let rows = body["data"]["contents"].as_array().unwrap();
    let changed = rows
        .iter()
        .find(|r| r["role"] == "customer" && r["channel"] == "email")
        .unwrap();
    assert_eq!(changed["subject"], "Hello {{app_name}}");
    // The retailer leaf is untouched.
    let retailer = rows
        .iter()
        .find(|r| r["role"] == "retailer" && r["channel"] == "email")
        .unwrap();
    assert_eq!(
        retailer["subject"],
        "Congratulations! Your {{app_name}} Retailer Account is Approved"
    );
}

#[tokio::test]
async fn template_field_update_rejects_field_missing_on_channel() {
    let ctx = build_test_context();
    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        "/v1/notifications/config/templates/tpl_retailer_approved",
        Some(json!({
            "role": "retailer",
            "channel": "sms",
            "field": "subject",
            "value": "nope",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1103);
}

#[tokio::test]
async fn replace_config_is_idempotent() {
    let ctx = build_test_context();

    let (_, before, _) = request_no_body(&ctx.app, "GET", "/v1/notifications/config").await;
    let doc = before["data"].clone();

    let (status, _, _) =
        request_json(&ctx.app, "POST", "/v1/notifications/config", Some(doc.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (_, after_once, _) = request_no_body(&ctx.app, "GET", "/v1/notifications/config").await;

    let (status, _, _) =
        request_json(&ctx.app, "POST", "/v1/notifications/config", Some(doc)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, after_twice, _) = request_no_body(&ctx.app, "GET", "/v1/notifications/config").await;

    assert_eq!(after_once["data"], after_twice["data"]);
    assert_eq!(before["data"], after_twice["data"]);
}

#[tokio::test]
async fn statuses_start_not_configured_without_seeds() {
    let ctx = build_test_context();
    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/notifications/credentials/statuses").await;

    assert_eq!(status, StatusCode::OK);
    for ch in ["email", "sms", "whatsapp", "push"] {
        assert_eq!(body["data"][ch], "not_configured", "channel {ch}");
    }
}

#[tokio::test]
async fn saving_credentials_configures_and_redacts() {
    let ctx = build_test_context();

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/email",
        Some(smtp_bundle()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);

    let (_, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/notifications/credentials/statuses").await;
    assert_eq!(body["data"]["email"], "configured");
    assert_eq!(body["data"]["sms"], "not_configured");

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/notifications/credentials").await;
    let email = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["channel"] == "email")
        .unwrap();
    assert_eq!(email["config"]["host"], "smtp.example.com");
    assert_eq!(email["config"]["password"], "***");
}

#[tokio::test]
async fn sentinel_roundtrip_preserves_saved_secret() {
    let ctx = build_test_context();

    request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/email",
        Some(smtp_bundle()),
    )
    .await;

    // Read back (redacted) and save the same bundle again, as the admin
    // UI does when an operator edits a non-secret field.
    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/notifications/credentials").await;
    let mut bundle = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["channel"] == "email")
        .unwrap()["config"]
        .clone();
    bundle["from_name"] = json!("TrendPin Notifications");

    let (status, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/email",
        Some(bundle),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The stored secret survived the sentinel round-trip: a connectivity
    // test still reaches the credential layer without a validation error
    // and the raw store keeps the original value.
    assert_eq!(
        ctx.state
            .credentials
            .raw_config(relaypost_common::types::Channel::Email)["password"],
        "hunter2"
    );
}

#[tokio::test]
async fn invalid_credential_save_is_rejected_without_status_change() {
    let ctx = build_test_context();

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/sms",
        Some(json!({"provider": "twilio", "account_id": "AC1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1104);

    let (_, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/notifications/credentials/statuses").await;
    assert_eq!(body["data"]["sms"], "not_configured");
}

#[tokio::test]
async fn unknown_channel_in_credential_routes_is_400() {
    let ctx = build_test_context();
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/fax",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1101);
}

#[tokio::test]
async fn failed_probe_is_data_and_does_not_downgrade() {
    let ctx = build_test_context();

    // A syntactically valid bundle pointing at a closed port.
    request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/sms",
        Some(generic_sms_bundle("http://127.0.0.1:1/send")),
    )
    .await;

    let (status, body, _) = request_no_body(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/sms/test",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], false);
    assert_eq!(body["data"]["message"], CONNECTION_FAILED);
    assert!(body["data"]["details"].is_string());

    // Probe failure never demotes a configured channel.
    let (_, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/notifications/credentials/statuses").await;
    assert_eq!(body["data"]["sms"], "configured");
}

#[tokio::test]
async fn candidate_bundle_test_failure_marks_unconfigured_channel_error() {
    let ctx = build_test_context();

    // Probe a candidate bundle without saving anything first.
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/sms/test",
        Some(generic_sms_bundle("http://127.0.0.1:1/send")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], false);
    assert_eq!(body["data"]["message"], CONNECTION_FAILED);

    // A failed probe on a channel that was never configured is an error;
    // nothing was stored by the probe.
    let (_, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/notifications/credentials/statuses").await;
    assert_eq!(body["data"]["sms"], "error");

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/notifications/credentials").await;
    let sms = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["channel"] == "sms")
        .unwrap();
    assert_eq!(sms["config"], serde_json::json!({}));
}

#[tokio::test]
async fn recipients_listing_returns_seeded_candidates() {
    let ctx = build_test_context();

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/notifications/recipients/retailer").await;
    assert_eq!(status, StatusCode::OK);
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "r-100");
    assert_eq!(list[0]["email"], "owner@velvetvine.example");

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/notifications/recipients/vendor").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1102);
}

#[tokio::test]
async fn send_test_on_unconfigured_channel_fails_as_data() {
    let ctx = build_test_context();

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/send-test",
        Some(json!({
            "channel": "sms",
            "recipient_type": "retailer",
            "recipient_id": "r-100",
            "event_id": "subscription_expiring",
            "placeholders": {"app_name": "TrendPin"},
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], false);
    assert_eq!(body["data"]["message"], NOT_CONFIGURED);
}

#[tokio::test]
async fn send_test_for_unknown_event_is_missing_template() {
    let ctx = build_test_context();
    request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/sms",
        Some(generic_sms_bundle("http://127.0.0.1:1/send")),
    )
    .await;

    let (_, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/send-test",
        Some(json!({
            "channel": "sms",
            "recipient_type": "retailer",
            "recipient_id": "r-100",
            "event_id": "retailer_banned",
            "placeholders": {},
        })),
    )
    .await;
    assert_eq!(body["data"]["success"], false);
    assert_eq!(body["data"]["message"], MISSING_TEMPLATE);
}

#[tokio::test]
async fn send_test_for_unaddressed_role_is_missing_template() {
    let ctx = build_test_context();
    request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/sms",
        Some(generic_sms_bundle("http://127.0.0.1:1/send")),
    )
    .await;

    // subscription_expiring addresses retailers only; the customer
    // bundle exists but is all-empty and unreachable.
    let (_, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/send-test",
        Some(json!({
            "channel": "sms",
            "recipient_type": "customer",
            "recipient_id": "c-200",
            "event_id": "subscription_expiring",
            "placeholders": {},
        })),
    )
    .await;
    assert_eq!(body["data"]["success"], false);
    assert_eq!(body["data"]["message"], MISSING_TEMPLATE);
}

#[tokio::test]
async fn send_test_provider_failure_downgrades_status() {
    let ctx = build_test_context();
    request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/credentials/sms",
        Some(generic_sms_bundle("http://127.0.0.1:1/send")),
    )
    .await;

    let (_, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/notifications/send-test",
        Some(json!({
            "channel": "sms",
            "recipient_type": "retailer",
            "recipient_id": "r-100",
            "event_id": "subscription_expiring",
            "placeholders": {"app_name": "TrendPin"},
        })),
    )
    .await;
    assert_eq!(body["data"]["success"], false);
    assert_eq!(body["data"]["message"], PROVIDER_ERROR);

    // An explicit delivery failure is a regression signal.
    let (_, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/notifications/credentials/statuses").await;
    assert_eq!(body["data"]["sms"], "error");
}
