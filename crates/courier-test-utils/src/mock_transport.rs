// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` implements `Transport` with a switchable readiness flag,
//! captured sends, per-chat failure injection and manual event emission.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use courier_core::{CourierError, Transport, TransportEvent};

/// A message captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text {
        chat_id: String,
        text: String,
    },
    Image {
        chat_id: String,
        bytes: Vec<u8>,
        mime_type: String,
        caption: String,
    },
}

impl SentMessage {
    pub fn chat_id(&self) -> &str {
        match self {
            SentMessage::Text { chat_id, .. } | SentMessage::Image { chat_id, .. } => chat_id,
        }
    }
}

/// A mock chat transport for testing.
pub struct MockTransport {
    ready: AtomicBool,
    sent: Mutex<Vec<SentMessage>>,
    failing_chats: Mutex<HashMap<String, String>>,
    panicking_chats: Mutex<Vec<String>>,
    events: broadcast::Sender<TransportEvent>,
    send_latency: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    connects: AtomicUsize,
    reconnects: AtomicUsize,
    resets: AtomicUsize,
    fail_session_calls: AtomicBool,
}

impl MockTransport {
    /// Create a mock transport that is not ready.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            ready: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            failing_chats: Mutex::new(HashMap::new()),
            panicking_chats: Mutex::new(Vec::new()),
            events,
            send_latency: Mutex::new(Duration::ZERO),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            connects: AtomicUsize::new(0),
            reconnects: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            fail_session_calls: AtomicBool::new(false),
        }
    }

    /// Create a mock transport that is already ready.
    pub fn ready() -> Self {
        let transport = Self::new();
        transport.ready.store(true, Ordering::SeqCst);
        transport
    }

    /// Flip readiness and emit the matching `Ready` or `Disconnected` event.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
        if ready {
            self.emit(TransportEvent::Ready);
        } else {
            self.emit(TransportEvent::Disconnected("mock disconnected".to_string()));
        }
    }

    /// Publish an event to all subscribers. Dropped silently if nobody listens.
    pub fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }

    /// Make every send to `chat_id` fail with `message`.
    pub fn fail_chat(&self, chat_id: impl Into<String>, message: impl Into<String>) {
        lock(&self.failing_chats).insert(chat_id.into(), message.into());
    }

    /// Make every send to `chat_id` panic inside the transport.
    pub fn panic_on_chat(&self, chat_id: impl Into<String>) {
        lock(&self.panicking_chats).push(chat_id.into());
    }

    /// Make `reconnect` and `reset_session` fail.
    pub fn fail_session_calls(&self, fail: bool) {
        self.fail_session_calls.store(fail, Ordering::SeqCst);
    }

    /// Time each send takes before completing.
    pub fn set_send_latency(&self, latency: Duration) {
        *lock(&self.send_latency) = latency;
    }

    /// All messages accepted so far, in send order.
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    pub fn sent_count(&self) -> usize {
        lock(&self.sent).len()
    }

    /// Highest number of sends observed in flight at once.
    pub fn max_concurrent_sends(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn reconnect_count(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    async fn record(&self, message: SentMessage) -> Result<(), CourierError> {
        if lock(&self.panicking_chats)
            .iter()
            .any(|chat| chat == message.chat_id())
        {
            panic!("mock transport panicked sending to {}", message.chat_id());
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let latency = *lock(&self.send_latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(reason) = lock(&self.failing_chats).get(message.chat_id()).cloned() {
            return Err(CourierError::transport(reason));
        }
        lock(&self.sent).push(message);
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self) -> Result<(), CourierError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), CourierError> {
        self.record(SentMessage::Text {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        })
        .await
    }

    async fn send_image(
        &self,
        chat_id: &str,
        bytes: &[u8],
        mime_type: &str,
        caption: &str,
    ) -> Result<(), CourierError> {
        self.record(SentMessage::Image {
            chat_id: chat_id.to_string(),
            bytes: bytes.to_vec(),
            mime_type: mime_type.to_string(),
            caption: caption.to_string(),
        })
        .await
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    async fn reconnect(&self) -> Result<(), CourierError> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_session_calls.load(Ordering::SeqCst) {
            return Err(CourierError::transport("mock reconnect failed"));
        }
        Ok(())
    }

    async fn reset_session(&self) -> Result<(), CourierError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        if self.fail_session_calls.load(Ordering::SeqCst) {
            return Err(CourierError::transport("mock reset failed"));
        }
        self.ready.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        self.ready.store(false, Ordering::SeqCst);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sends_in_order() {
        let transport = MockTransport::ready();
        transport.send_text("1@c.us", "a").await.unwrap();
        transport
            .send_image("2@c.us", &[1, 2], "image/png", "")
            .await
            .unwrap();

        let sent = transport.sent_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].chat_id(), "1@c.us");
        assert!(matches!(&sent[1], SentMessage::Image { mime_type, .. } if mime_type == "image/png"));
        assert_eq!(transport.max_concurrent_sends(), 1);
    }

    #[tokio::test]
    async fn failing_chat_rejects_send() {
        let transport = MockTransport::ready();
        transport.fail_chat("9@c.us", "blocked");
        let err = transport.send_text("9@c.us", "x").await.unwrap_err();
        assert!(err.to_string().contains("blocked"));
        assert_eq!(transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn set_ready_emits_events() {
        let transport = MockTransport::new();
        let mut rx = transport.subscribe();
        assert!(!transport.is_ready());

        transport.set_ready(true);
        assert!(transport.is_ready());
        assert_eq!(rx.recv().await.unwrap(), TransportEvent::Ready);

        transport.set_ready(false);
        assert!(matches!(rx.recv().await.unwrap(), TransportEvent::Disconnected(_)));
    }
}
