// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport adapter trait for the chat session that delivers messages.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::CourierError;

/// Session lifecycle notifications published by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A new pairing code (QR payload) must be scanned to authenticate.
    PairingCodeIssued(String),
    /// Credentials were accepted; the session is still loading.
    Authenticated,
    /// The session can accept sends.
    Ready,
    /// The session dropped.
    Disconnected(String),
    /// Pairing or stored credentials were rejected.
    AuthFailed(String),
}

/// Adapter over the external chat session.
///
/// The gateway never inspects the session itself: it asks for readiness,
/// hands over normalized chat addresses and payloads, and listens to the
/// event stream for pairing and connection changes.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Returns the human-readable name of this transport.
    fn name(&self) -> &str;

    /// Starts the session. Returns once startup was initiated, not when ready.
    async fn connect(&self) -> Result<(), CourierError>;

    /// Whether the session can accept sends right now.
    fn is_ready(&self) -> bool;

    /// Sends a text message to a normalized chat address.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), CourierError>;

    /// Sends an image with a caption (possibly empty) to a normalized chat address.
    async fn send_image(
        &self,
        chat_id: &str,
        bytes: &[u8],
        mime_type: &str,
        caption: &str,
    ) -> Result<(), CourierError>;

    /// Subscribes to session lifecycle events.
    fn subscribe(&self) -> broadcast::Receiver<TransportEvent>;

    /// Tears the session down and starts it again with stored credentials.
    async fn reconnect(&self) -> Result<(), CourierError>;

    /// Like [`reconnect`](Transport::reconnect), but discards stored
    /// credentials first so a fresh pairing is required.
    async fn reset_session(&self) -> Result<(), CourierError>;

    /// Releases the session.
    async fn shutdown(&self) -> Result<(), CourierError>;
}
