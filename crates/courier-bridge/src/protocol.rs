// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types of the sidecar API and the session-status diffing rules.

use serde::{Deserialize, Serialize};

use courier_core::TransportEvent;

/// Session state as reported by `GET /session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeState {
    #[default]
    Disconnected,
    Pairing,
    Authenticated,
    Ready,
    AuthFailed,
}

/// Body of `GET /session`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionStatus {
    pub state: BridgeState,
    #[serde(default)]
    pub qr: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `POST /messages/text`.
#[derive(Debug, Serialize)]
pub struct TextMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

/// Body of `POST /messages/media`. `data` is base64.
#[derive(Debug, Serialize)]
pub struct MediaMessage<'a> {
    pub chat_id: &'a str,
    pub mime_type: &'a str,
    pub data: String,
    pub caption: &'a str,
}

/// Error body the sidecar returns on failures.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// What the poller last told subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observed {
    pub state: BridgeState,
    pub qr: Option<String>,
}

impl Observed {
    /// Folds `next` into the observation and returns the events to publish.
    pub fn advance(&mut self, next: &SessionStatus) -> Vec<TransportEvent> {
        let mut events = Vec::new();

        if next.state != self.state {
            match next.state {
                BridgeState::Authenticated => events.push(TransportEvent::Authenticated),
                BridgeState::Ready => events.push(TransportEvent::Ready),
                BridgeState::Disconnected => events.push(TransportEvent::Disconnected(
                    next.reason
                        .clone()
                        .unwrap_or_else(|| "session disconnected".to_string()),
                )),
                BridgeState::AuthFailed => events.push(TransportEvent::AuthFailed(
                    next.reason
                        .clone()
                        .unwrap_or_else(|| "authentication failed".to_string()),
                )),
                // Dropped out of an established session.
                BridgeState::Pairing
                    if matches!(self.state, BridgeState::Ready | BridgeState::Authenticated) =>
                {
                    events.push(TransportEvent::Disconnected(
                        next.reason
                            .clone()
                            .unwrap_or_else(|| "session awaiting pairing".to_string()),
                    ));
                }
                BridgeState::Pairing => {}
            }
            self.state = next.state;
        }

        if let Some(qr) = next.qr.as_ref().filter(|qr| !qr.is_empty())
            && self.qr.as_ref() != Some(qr)
        {
            events.push(TransportEvent::PairingCodeIssued(qr.clone()));
        }
        self.qr = next.qr.clone();

        events
    }

    /// Records that the sidecar became unreachable.
    pub fn lost(&mut self) {
        self.state = BridgeState::Disconnected;
        self.qr = None;
    }
}
