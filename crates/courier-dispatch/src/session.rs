// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracks the transport session from its event stream.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use courier_core::{SessionState, TransportEvent};

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Pairing code awaiting a scan, if any.
    pub pairing_code: Option<String>,
    /// Reason attached to the last disconnect or auth failure.
    pub last_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: SessionState::Disconnected,
            pairing_code: None,
            last_reason: None,
            updated_at: Utc::now(),
        }
    }
}

/// Holds the latest [`SessionSnapshot`], updated by [`SessionMonitor::apply`].
#[derive(Debug, Default)]
pub struct SessionMonitor {
    snapshot: RwLock<SessionSnapshot>,
}

impl SessionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    pub fn pairing_code(&self) -> Option<String> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .pairing_code
            .clone()
    }

    /// Folds one transport event into the snapshot.
    pub fn apply(&self, event: TransportEvent) {
        let mut snap = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match event {
            TransportEvent::PairingCodeIssued(code) => {
                info!("pairing code issued, waiting for scan");
                snap.state = SessionState::Pairing;
                snap.pairing_code = Some(code);
            }
            TransportEvent::Authenticated => {
                info!("session authenticated");
                snap.state = SessionState::Authenticated;
                snap.pairing_code = None;
            }
            TransportEvent::Ready => {
                info!("session ready");
                snap.state = SessionState::Ready;
                snap.pairing_code = None;
            }
            TransportEvent::Disconnected(reason) => {
                warn!(reason = reason.as_str(), "session disconnected");
                snap.state = SessionState::Disconnected;
                snap.pairing_code = None;
                snap.last_reason = Some(reason);
            }
            TransportEvent::AuthFailed(reason) => {
                warn!(reason = reason.as_str(), "session authentication failed");
                snap.state = SessionState::Disconnected;
                snap.last_reason = Some(reason);
            }
        }
        snap.updated_at = Utc::now();
    }

    /// Applies events from `events` until the channel closes or `cancel` fires.
    pub fn spawn(
        self: &Arc<Self>,
        mut events: broadcast::Receiver<TransportEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = events.recv() => match received {
                        Ok(event) => monitor.apply(event),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "session monitor lagged behind transport events");
                        }
                        Err(RecvError::Closed) => {
                            debug!("transport event channel closed");
                            break;
                        }
                    },
                    _ = cancel.cancelled() => break,
                }
            }
            debug!("session monitor stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn follows_pairing_lifecycle() {
        let monitor = SessionMonitor::new();
        assert_eq!(monitor.state(), SessionState::Disconnected);

        monitor.apply(TransportEvent::PairingCodeIssued("qr-1".into()));
        assert_eq!(monitor.state(), SessionState::Pairing);
        assert_eq!(monitor.pairing_code().as_deref(), Some("qr-1"));

        monitor.apply(TransportEvent::Authenticated);
        assert_eq!(monitor.state(), SessionState::Authenticated);
        assert!(monitor.pairing_code().is_none());

        monitor.apply(TransportEvent::Ready);
        assert_eq!(monitor.state(), SessionState::Ready);
    }

    #[test]
    fn disconnect_clears_code_and_keeps_reason() {
        let monitor = SessionMonitor::new();
        monitor.apply(TransportEvent::PairingCodeIssued("qr".into()));
        monitor.apply(TransportEvent::Disconnected("NAVIGATION".into()));

        let snap = monitor.snapshot();
        assert_eq!(snap.state, SessionState::Disconnected);
        assert!(snap.pairing_code.is_none());
        assert_eq!(snap.last_reason.as_deref(), Some("NAVIGATION"));
    }

    #[test]
    fn auth_failure_keeps_code() {
        let monitor = SessionMonitor::new();
        monitor.apply(TransportEvent::PairingCodeIssued("qr".into()));
        monitor.apply(TransportEvent::AuthFailed("bad creds".into()));

        let snap = monitor.snapshot();
        assert_eq!(snap.state, SessionState::Disconnected);
        assert_eq!(snap.pairing_code.as_deref(), Some("qr"));
        assert_eq!(snap.last_reason.as_deref(), Some("bad creds"));
    }

    #[tokio::test]
    async fn spawned_monitor_applies_events_until_closed() {
        let monitor = Arc::new(SessionMonitor::new());
        let (tx, rx) = broadcast::channel(8);
        let handle = monitor.spawn(rx, CancellationToken::new());

        tx.send(TransportEvent::PairingCodeIssued("abc".into())).unwrap();
        tx.send(TransportEvent::Ready).unwrap();
        drop(tx);

        handle.await.unwrap();
        assert_eq!(monitor.state(), SessionState::Ready);
    }

    #[tokio::test]
    #[traced_test]
    async fn lagging_monitor_skips_ahead_and_logs() {
        let monitor = Arc::new(SessionMonitor::new());
        let (tx, rx) = broadcast::channel(1);
        tx.send(TransportEvent::PairingCodeIssued("old".into())).unwrap();
        tx.send(TransportEvent::PairingCodeIssued("new".into())).unwrap();
        drop(tx);

        monitor.spawn(rx, CancellationToken::new()).await.unwrap();
        assert_eq!(monitor.pairing_code().as_deref(), Some("new"));
        assert!(logs_contain("session monitor lagged behind transport events"));
    }

    #[tokio::test]
    async fn spawned_monitor_stops_on_cancel() {
        let monitor = Arc::new(SessionMonitor::new());
        let (_tx, rx) = broadcast::channel::<TransportEvent>(8);
        let cancel = CancellationToken::new();
        let handle = monitor.spawn(rx, cancel.clone());

        cancel.cancel();
        handle.await.unwrap();
    }
}
