// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded in-memory delivery history.
//!
//! Entries are kept newest first. Once `capacity` is reached, recording a new
//! entry evicts the oldest one.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use serde::Serialize;

use courier_core::{DeliveryOutcome, HistoryEntry, MessageKind};

/// Default number of entries kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Default page size for [`HistoryStore::query`].
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Conjunctive filters for history queries. `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub outcome: Option<DeliveryOutcome>,
    pub kind: Option<MessageKind>,
}

impl HistoryFilter {
    fn matches(&self, entry: &HistoryEntry) -> bool {
        self.outcome.is_none_or(|o| o == entry.outcome) && self.kind.is_none_or(|k| k == entry.kind)
    }
}

/// One page of filtered history, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    /// Number of entries matching the filter (before pagination).
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub entries: Vec<HistoryEntry>,
}

/// Per-kind entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub text: usize,
    pub image: usize,
}

/// Aggregate counters over the whole history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    /// Percentage of sent entries, two decimals. `0.0` when empty.
    pub success_rate: f64,
    pub by_type: KindCounts,
}

#[derive(Debug)]
pub struct HistoryStore {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl HistoryStore {
    /// Creates an empty store. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Prepends `entry`, evicting the oldest entries beyond capacity.
    pub fn record(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Filters, then paginates. `limit` is clamped to `1..=capacity`.
    pub fn query(&self, filter: HistoryFilter, limit: usize, offset: usize) -> HistoryPage {
        let limit = limit.clamp(1, self.capacity);
        let entries = self.read();
        let matching = entries.iter().filter(|e| filter.matches(e));

        let total = matching.clone().count();
        let page = matching.skip(offset).take(limit).cloned().collect();

        HistoryPage {
            total,
            limit,
            offset,
            entries: page,
        }
    }

    pub fn stats(&self) -> HistoryStats {
        let entries = self.read();
        let mut sent = 0;
        let mut by_type = KindCounts::default();
        for entry in entries.iter() {
            if entry.outcome == DeliveryOutcome::Sent {
                sent += 1;
            }
            match entry.kind {
                MessageKind::Text => by_type.text += 1,
                MessageKind::Image => by_type.image += 1,
            }
        }

        let total = entries.len();
        let success_rate = if total == 0 {
            0.0
        } else {
            (sent as f64 / total as f64 * 10_000.0).round() / 100.0
        };

        HistoryStats {
            total,
            sent,
            failed: total - sent,
            success_rate,
            by_type,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, VecDeque<HistoryEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
