// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Randomized pacing between deliveries.

use std::time::Duration;

use rand::Rng;

/// Delay bounds applied by the dispatch worker.
///
/// `min_delay..=max_delay` is the pause between two consecutive deliveries;
/// `typing_min..=typing_max` is the short pause before each text send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub typing_min: Duration,
    pub typing_max: Duration,
}

impl PacingPolicy {
    /// No pauses at all.
    pub fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            typing_min: Duration::ZERO,
            typing_max: Duration::ZERO,
        }
    }

    /// Pause to apply after a delivery when more tasks are pending.
    pub fn next_delay(&self) -> Duration {
        uniform_between(self.min_delay, self.max_delay)
    }

    /// Pause to apply before a text send.
    pub fn typing_delay(&self) -> Duration {
        uniform_between(self.typing_min, self.typing_max)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(60),
            max_delay: Duration::from_secs(90),
            typing_min: Duration::from_millis(500),
            typing_max: Duration::from_millis(1500),
        }
    }
}

/// Uniform sample in `[lo, hi]` at millisecond resolution. Collapses to `lo` if `hi <= lo`.
fn uniform_between(lo: Duration, hi: Duration) -> Duration {
    if hi <= lo {
        return lo;
    }
    let lo_ms = lo.as_millis() as u64;
    let hi_ms = hi.as_millis() as u64;
    Duration::from_millis(rand::thread_rng().gen_range(lo_ms..=hi_ms))
}
