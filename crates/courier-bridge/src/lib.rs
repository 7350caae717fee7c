// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-session sidecar adapter.
//!
//! Implements [`Transport`] against a sidecar process that owns the browser
//! session. Sends are plain JSON calls; session state is polled from
//! `GET /session` and republished as [`TransportEvent`]s.

pub mod client;
pub mod poller;
pub mod protocol;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use courier_core::{CourierError, Transport, TransportEvent};

use crate::client::BridgeClient;
use crate::poller::PollerShared;

/// Capacity of the event channel; slow subscribers see `Lagged`.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Bridge adapter configuration.
///
/// Mirrors `BridgeConfig` from `courier-config` to avoid a dependency on the
/// config crate from the adapter crate.
#[derive(Clone)]
pub struct BridgeConfig {
    pub base_url: String,
    /// Bearer token sent to the sidecar, if it requires one.
    pub token: Option<String>,
    pub poll_interval: Duration,
    pub max_backoff: Duration,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("poll_interval", &self.poll_interval)
            .field("max_backoff", &self.max_backoff)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// [`Transport`] backed by the sidecar HTTP API.
pub struct BridgeTransport {
    shared: Arc<PollerShared>,
    poll_interval: Duration,
    max_backoff: Duration,
    poller: Mutex<Option<CancellationToken>>,
}

impl BridgeTransport {
    pub fn new(config: BridgeConfig) -> Result<Self, CourierError> {
        let client = BridgeClient::new(&config)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            shared: Arc::new(PollerShared {
                client,
                ready: AtomicBool::new(false),
                events,
            }),
            poll_interval: config.poll_interval,
            max_backoff: config.max_backoff,
            poller: Mutex::new(None),
        })
    }

    /// Starts the session poller unless one is already running.
    fn ensure_poller(&self) {
        let mut slot = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        tokio::spawn(poller::run(
            Arc::clone(&self.shared),
            self.poll_interval,
            self.max_backoff,
            cancel.clone(),
        ));
        *slot = Some(cancel);
    }

    fn stop_poller(&self) {
        let token = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = token {
            token.cancel();
        }
    }

    fn mark_not_ready(&self) {
        self.shared.ready.store(false, Ordering::Release);
    }

    /// Runs session `actions` in order on a detached task.
    ///
    /// The sequence completes even if the caller is dropped midway, so a
    /// timed-out request cannot leave the sidecar logged out but not started.
    async fn run_session_actions(
        &self,
        actions: &'static [&'static str],
    ) -> Result<(), CourierError> {
        let shared = Arc::clone(&self.shared);
        let sequence = tokio::spawn(async move {
            for action in actions {
                shared.client.session_action(action).await?;
            }
            Ok(())
        });
        sequence
            .await
            .map_err(|e| CourierError::Internal(format!("session call aborted: {e}")))?
    }
}

impl Drop for BridgeTransport {
    fn drop(&mut self) {
        self.stop_poller();
    }
}

#[async_trait]
impl Transport for BridgeTransport {
    fn name(&self) -> &str {
        "bridge"
    }

    async fn connect(&self) -> Result<(), CourierError> {
        info!("starting bridge session");
        self.ensure_poller();
        self.run_session_actions(&["start"]).await
    }

    fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::Acquire)
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), CourierError> {
        debug!(chat_id, "sending text through bridge");
        self.shared.client.send_text(chat_id, text).await
    }

    async fn send_image(
        &self,
        chat_id: &str,
        bytes: &[u8],
        mime_type: &str,
        caption: &str,
    ) -> Result<(), CourierError> {
        debug!(chat_id, mime_type, bytes = bytes.len(), "sending media through bridge");
        self.shared
            .client
            .send_media(chat_id, bytes, mime_type, caption)
            .await
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.shared.events.subscribe()
    }

    async fn reconnect(&self) -> Result<(), CourierError> {
        info!("restarting bridge session");
        self.mark_not_ready();
        self.ensure_poller();
        self.run_session_actions(&["restart"]).await
    }

    async fn reset_session(&self) -> Result<(), CourierError> {
        info!("discarding bridge credentials and starting a fresh session");
        self.mark_not_ready();
        self.ensure_poller();
        self.run_session_actions(&["logout", "start"]).await
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        info!("stopping bridge session");
        self.stop_poller();
        self.mark_not_ready();
        self.shared.client.session_action("stop").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> BridgeConfig {
        BridgeConfig {
            base_url,
            token: Some("bridge-secret".into()),
            poll_interval: Duration::from_millis(20),
            max_backoff: Duration::from_millis(80),
            request_timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn config_debug_redacts_token() {
        let debug = format!("{:?}", config("http://x".into()));
        assert!(!debug.contains("bridge-secret"));
        assert!(debug.contains("[redacted]"));
    }

    #[tokio::test]
    #[traced_test]
    async fn unreachable_bridge_is_logged_and_reported_once() {
        let transport =
            BridgeTransport::new(config("http://127.0.0.1:1".into())).unwrap();
        let mut events = transport.subscribe();

        assert!(transport.connect().await.is_err());
        let first = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(first, TransportEvent::Disconnected(_)));

        // Further failures in the same streak stay quiet.
        let more = tokio::time::timeout(Duration::from_millis(200), events.recv()).await;
        assert!(more.is_err());
        assert!(!transport.is_ready());
        assert!(logs_contain("bridge session poll failed"));
    }

    #[tokio::test]
    async fn shutdown_stops_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session/stop"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = BridgeTransport::new(config(server.uri())).unwrap();
        transport.shutdown().await.unwrap();
        assert!(!transport.is_ready());
    }
}
