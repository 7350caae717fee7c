// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full gateway stack (dispatch queue, status
//! table, history, session monitor and router) around mock adapters. Requests
//! are driven through the router in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use courier_core::{CourierError, Transport, TransportEvent};
use courier_dispatch::{DispatchQueue, HistoryStore, PacingPolicy, SessionMonitor, StatusTable};
use courier_gateway::{AuthConfig, GatewayState, build_router};

use crate::mock_fetcher::MockImageFetcher;
use crate::mock_transport::MockTransport;

/// Bearer token configured by default in harnesses.
pub const TEST_TOKEN: &str = "test-token";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    ready: bool,
    pacing: PacingPolicy,
    bearer_token: Option<String>,
    history_capacity: usize,
    start_worker: bool,
    request_timeout: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            ready: true,
            pacing: PacingPolicy::immediate(),
            bearer_token: Some(TEST_TOKEN.to_string()),
            history_capacity: courier_dispatch::DEFAULT_HISTORY_CAPACITY,
            start_worker: true,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Whether the mock transport starts ready (default: `true`).
    pub fn ready(mut self, ready: bool) -> Self {
        self.ready = ready;
        self
    }

    /// Pacing used by the worker (default: no delays).
    pub fn pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Gateway bearer token (default: [`TEST_TOKEN`]).
    pub fn bearer_token(mut self, token: Option<&str>) -> Self {
        self.bearer_token = token.map(str::to_string);
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Whether to spawn the dispatch worker (default: `true`).
    pub fn start_worker(mut self, start: bool) -> Self {
        self.start_worker = start;
        self
    }

    /// Build the harness. Must be called inside a tokio runtime.
    pub fn build(self) -> Result<TestHarness, CourierError> {
        let transport = Arc::new(if self.ready {
            MockTransport::ready()
        } else {
            MockTransport::new()
        });
        let fetcher = Arc::new(MockImageFetcher::new());
        let status = Arc::new(StatusTable::new());
        let history = Arc::new(HistoryStore::new(self.history_capacity));

        let queue = Arc::new(DispatchQueue::new(
            transport.clone(),
            fetcher.clone(),
            Arc::clone(&status),
            Arc::clone(&history),
            self.pacing,
        ));

        let cancel = CancellationToken::new();
        let session = Arc::new(SessionMonitor::new());
        if self.ready {
            session.apply(TransportEvent::Ready);
        }
        session.spawn(transport.subscribe(), cancel.clone());

        if self.start_worker {
            queue.spawn_worker(cancel.clone())?;
        }

        let state = GatewayState::new(
            Arc::clone(&queue),
            Arc::clone(&session),
            transport.clone(),
            AuthConfig {
                bearer_token: self.bearer_token,
            },
        );
        let router = build_router(state, self.request_timeout);

        Ok(TestHarness {
            transport,
            fetcher,
            queue,
            status,
            history,
            session,
            router,
            cancel,
        })
    }
}

/// A response captured by [`TestHarness::request`].
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Body parsed as JSON. Panics if it is not valid JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("response body is not JSON ({e}): {}", self.body))
    }
}

/// A complete gateway stack around mock adapters.
pub struct TestHarness {
    pub transport: Arc<MockTransport>,
    pub fetcher: Arc<MockImageFetcher>,
    pub queue: Arc<DispatchQueue>,
    pub status: Arc<StatusTable>,
    pub history: Arc<HistoryStore>,
    pub session: Arc<SessionMonitor>,
    pub router: Router,
    /// Cancelled on drop; stops the worker and the session monitor.
    pub cancel: CancellationToken,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send a request through the router. `token` becomes a bearer header.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("valid test request");

        self.send(request).await
    }

    /// Send a prepared request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    /// POST `body` with the default test token.
    pub async fn post(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), Some(TEST_TOKEN))
            .await
    }

    /// Queue a text message through the HTTP surface and return the task id.
    pub async fn send_text(&self, to: &str, text: &str) -> String {
        let response = self
            .post(
                "/rest/sendMessage/test/text",
                serde_json::json!({ "messageData": { "to": to, "text": text } }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.json()["task_id"]
            .as_str()
            .expect("task_id in response")
            .to_string()
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Polls `condition` every 10ms until it holds or `timeout` elapses.
///
/// Works under paused tokio time, where sleeps auto-advance the clock.
pub async fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
