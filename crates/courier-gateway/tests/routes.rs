// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests for the gateway HTTP surface.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use courier_core::TransportEvent;
use courier_test_utils::{TEST_TOKEN, TestHarness, wait_for};

const TEXT_ROUTE: &str = "/rest/sendMessage/default/text";
const IMAGE_ROUTE: &str = "/rest/sendMessage/default/image";

fn harness() -> TestHarness {
    TestHarness::builder().build().unwrap()
}

fn text_body(to: &str, text: &str) -> serde_json::Value {
    json!({ "messageData": { "to": to, "text": text } })
}

#[tokio::test]
async fn health_reports_readiness_and_sizes() {
    let h = TestHarness::builder().start_worker(false).build().unwrap();
    h.send_text("5511", "hi").await;

    let res = h.get("/health").await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["status"], "online");
    assert_eq!(body["whatsapp_ready"], true);
    assert_eq!(body["queue_size"], 1);
    assert_eq!(body["history_size"], 0);
    assert_eq!(body["session_state"], "ready");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn send_text_requires_auth() {
    let h = harness();

    let res = h
        .request(Method::POST, TEXT_ROUTE, Some(text_body("1", "x")), None)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["error"], "missing authorization token");

    let res = h
        .request(Method::POST, TEXT_ROUTE, Some(text_body("1", "x")), Some("wrong"))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["error"], "invalid token");
    assert!(h.status.is_empty());
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let h = harness();
    let request = Request::builder()
        .method(Method::POST)
        .uri(TEXT_ROUTE)
        .header(header::AUTHORIZATION, format!("Basic {TEST_TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(text_body("1", "x").to_string()))
        .unwrap();
    let res = h.send(request).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["error"], "invalid token");
}

#[tokio::test]
async fn protected_routes_fail_closed_without_configured_token() {
    let h = TestHarness::builder().bearer_token(None).build().unwrap();

    let res = h.post(TEXT_ROUTE, text_body("1", "x")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = h.request(Method::POST, "/reconnect", None, Some(TEST_TOKEN)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(h.transport.reconnect_count(), 0);
}

#[tokio::test]
async fn send_text_is_queued_and_delivered() {
    let h = harness();

    let res = h.post(TEXT_ROUTE, text_body("5511-9999", "hello")).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["queue_position"], 1);
    let task_id = body["task_id"].as_str().unwrap().to_string();

    assert!(wait_for(Duration::from_secs(2), || h.history.len() == 1).await);

    let res = h.get(&format!("/queue/status/{task_id}")).await;
    assert_eq!(res.status, StatusCode::OK);
    let record = res.json();
    assert_eq!(record["status"], "sent");
    assert_eq!(record["type"], "text");
    assert_eq!(record["to"], "5511-9999");
    assert!(record["completed_at"].is_string());

    assert_eq!(h.transport.sent_messages()[0].chat_id(), "55119999@c.us");
}

#[tokio::test]
async fn missing_fields_are_bad_requests() {
    let h = harness();

    for body in [
        json!({}),
        json!({ "messageData": { "to": "1" } }),
        json!({ "messageData": { "to": "1", "text": "" } }),
        json!({ "messageData": { "text": "hi" } }),
    ] {
        let res = h.post(TEXT_ROUTE, body.clone()).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(res.json()["error"], r#"fields "to" and "text" are required"#);
    }

    let res = h
        .post(IMAGE_ROUTE, json!({ "messageData": { "to": "1", "caption": "c" } }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(h.status.is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let h = harness();
    let request = Request::builder()
        .method(Method::POST)
        .uri(TEXT_ROUTE)
        .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = h.send(request).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().contains("invalid request body"));
}

#[tokio::test]
async fn not_ready_is_service_unavailable_and_creates_no_task() {
    let h = TestHarness::builder().ready(false).build().unwrap();

    let res = h.post(TEXT_ROUTE, text_body("1", "x")).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.json()["error"], "transport is not ready");

    // Readiness is checked before the body.
    let res = h.post(TEXT_ROUTE, json!({})).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);

    assert!(h.status.is_empty());
    assert!(h.queue.is_empty());
}

#[tokio::test]
async fn send_image_queues_with_caption() {
    let h = harness();
    h.fetcher.with_image("http://img/a.gif", vec![7], "image/gif");

    let res = h
        .post(
            IMAGE_ROUTE,
            json!({ "messageData": { "to": "123@g.us", "imageUrl": "http://img/a.gif", "caption": "look" } }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["queue_position"], 1);

    assert!(wait_for(Duration::from_secs(2), || h.transport.sent_count() == 1).await);
    match &h.transport.sent_messages()[0] {
        courier_test_utils::SentMessage::Image {
            chat_id,
            mime_type,
            caption,
            ..
        } => {
            assert_eq!(chat_id, "123@g.us");
            assert_eq!(mime_type, "image/gif");
            assert_eq!(caption, "look");
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let h = harness();
    let res = h.get("/queue/status/does-not-exist").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "task id not found");
}

#[tokio::test]
async fn queue_status_and_list_reflect_pending_tasks() {
    let h = TestHarness::builder().start_worker(false).build().unwrap();
    let first = h.send_text("1", "a").await;
    let second = h.send_text("2", "b").await;

    let res = h.get("/queue/status").await;
    let body = res.json();
    assert_eq!(body["queue_size"], 2);
    assert_eq!(body["total_tasks"], 2);
    assert_eq!(body["draining"], false);
    assert_eq!(body["tasks"][&first]["status"], "queued");
    assert_eq!(body["tasks"][&second]["position"], 2);

    let res = h.get("/queue/list").await;
    let body = res.json();
    assert_eq!(body["queue_size"], 2);
    assert_eq!(body["tasks"][0]["task_id"], first);
    assert_eq!(body["tasks"][0]["position"], 1);
    assert_eq!(body["tasks"][1]["to"], "2");
    assert_eq!(body["tasks"][1]["type"], "text");
}

#[tokio::test]
async fn history_filters_and_stats() {
    let h = harness();
    h.transport.fail_chat("9@c.us", "blocked");

    h.send_text("1", "ok").await;
    h.send_text("9", "nope").await;
    assert!(wait_for(Duration::from_secs(2), || h.history.len() == 2).await);

    let body = h.get("/history?status=failed").await.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["entries"][0]["to"], "9");
    assert_eq!(body["entries"][0]["status"], "failed");
    assert!(body["entries"][0]["error"].as_str().unwrap().contains("blocked"));

    let body = h.get("/history?type=text&limit=1&offset=1").await.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["entries"][0]["to"], "1");
    assert_eq!(body["entries"][0]["content"]["text"], "ok");

    let body = h.get("/history/stats").await.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["success_rate"], 50.0);
    assert_eq!(body["by_type"]["text"], 2);
    assert_eq!(body["by_type"]["image"], 0);
}

#[tokio::test]
async fn history_rejects_unknown_filters() {
    let h = harness();
    assert_eq!(h.get("/history?status=pending").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(h.get("/history?type=video").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(h.get("/history?limit=abc").await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_defaults_to_fifty_entries() {
    let h = TestHarness::builder().start_worker(false).build().unwrap();
    let body = h.get("/history").await.json();
    assert_eq!(body["limit"], 50);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn qr_reports_connection_state() {
    let h = harness();
    let body = h.get("/qr").await.json();
    assert_eq!(body["message"], "already connected");

    let h = TestHarness::builder().ready(false).build().unwrap();
    let body = h.get("/qr").await.json();
    assert_eq!(body["message"], "waiting for QR code");

    h.transport
        .emit(TransportEvent::PairingCodeIssued("2@pairing-code".into()));
    assert!(wait_for(Duration::from_secs(2), || h.session.pairing_code().is_some()).await);

    let res = h.get("/qr").await;
    assert_eq!(res.status, StatusCode::OK);
    let content_type = res.headers[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    assert!(res.body.contains("data:image/svg+xml;base64,"));
}

#[tokio::test]
async fn reconnect_and_reset_call_the_transport() {
    let h = harness();

    let res = h.request(Method::POST, "/reconnect", None, Some(TEST_TOKEN)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "success");
    assert_eq!(h.transport.reconnect_count(), 1);

    let res = h
        .request(Method::POST, "/reset-session", None, Some(TEST_TOKEN))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(h.transport.reset_count(), 1);

    h.transport.fail_session_calls(true);
    let res = h.request(Method::POST, "/reconnect", None, Some(TEST_TOKEN)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.json()["error"].as_str().unwrap().contains("reconnect failed"));
}

#[tokio::test]
async fn successful_send_is_excluded_from_failed_history() {
    let h = harness();
    h.send_text("42", "done").await;
    assert!(wait_for(Duration::from_secs(2), || h.history.len() == 1).await);

    let body = h.get("/history?status=failed").await.json();
    assert_eq!(body["total"], 0);
    let body = h.get("/history/stats").await.json();
    assert_eq!(body["success_rate"], 100.0);
}
