// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery engine for the Courier gateway.
//!
//! - [`DispatchQueue`]: FIFO of send tasks drained by a single paced worker
//! - [`StatusTable`]: per-task lifecycle records
//! - [`HistoryStore`]: bounded newest-first delivery history
//! - [`SessionMonitor`]: session state derived from transport events
//! - [`HttpImageFetcher`]: `reqwest`-backed image downloads

pub mod fetch;
pub mod history;
pub mod pacing;
pub mod queue;
pub mod session;
pub mod status;

pub use fetch::HttpImageFetcher;
pub use history::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_PAGE_LIMIT, HistoryFilter, HistoryPage, HistoryStats,
    HistoryStore, KindCounts,
};
pub use pacing::PacingPolicy;
pub use queue::DispatchQueue;
pub use session::{SessionMonitor, SessionSnapshot};
pub use status::StatusTable;
