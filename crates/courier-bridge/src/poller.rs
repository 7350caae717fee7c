// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background session poller.
//!
//! Reads `GET /session` every poll interval and republishes changes as
//! [`TransportEvent`]s. While the sidecar is unreachable the interval doubles
//! up to the configured maximum, and resets after the next successful poll.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use courier_core::TransportEvent;

use crate::client::BridgeClient;
use crate::protocol::{BridgeState, Observed};

/// Exponential backoff between `base` and `max`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let max = max.max(base);
        Self {
            base,
            max,
            current: base,
        }
    }

    /// Returns the delay to wait now and doubles the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

/// Shared state written by the poller and read by the transport.
pub(crate) struct PollerShared {
    pub client: BridgeClient,
    pub ready: AtomicBool,
    pub events: broadcast::Sender<TransportEvent>,
}

impl PollerShared {
    pub fn publish(&self, event: TransportEvent) {
        debug!(?event, "bridge event");
        // No subscribers is fine; events are advisory.
        let _ = self.events.send(event);
    }
}

pub(crate) async fn run(
    shared: Arc<PollerShared>,
    poll_interval: Duration,
    max_backoff: Duration,
    cancel: CancellationToken,
) {
    let mut observed = Observed::default();
    let mut backoff = Backoff::new(poll_interval, max_backoff);
    let mut failing = false;

    info!(?poll_interval, "bridge session poller started");

    loop {
        let delay = match shared.client.session().await {
            Ok(status) => {
                if failing {
                    info!("bridge reachable again");
                    failing = false;
                }
                backoff.reset();

                shared
                    .ready
                    .store(status.state == BridgeState::Ready, Ordering::Release);
                for event in observed.advance(&status) {
                    shared.publish(event);
                }
                poll_interval
            }
            Err(e) => {
                shared.ready.store(false, Ordering::Release);
                if !failing {
                    warn!(error = %e, "bridge session poll failed");
                    failing = true;
                    observed.lost();
                    shared.publish(TransportEvent::Disconnected(e.to_string()));
                } else {
                    debug!(error = %e, "bridge still unreachable");
                }
                backoff.next_delay()
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => break,
        }
    }

    debug!("bridge session poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_cap_and_resets() {
        let mut backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(10));
        let delays: Vec<_> = (0..5).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 10, 10]);

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    }

    #[test]
    fn backoff_cap_never_below_base() {
        let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
    }
}
