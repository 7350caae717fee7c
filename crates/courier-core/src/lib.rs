// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Courier messaging gateway.
//!
//! This crate provides the error type, the task/status/history data model,
//! recipient normalization, and the adapter traits for the external chat
//! transport and image downloads.

pub mod error;
pub mod phone;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CourierError;
pub use phone::normalize;
pub use traits::{ImageFetcher, Transport, TransportEvent};
pub use types::{
    DeliveryOutcome, FetchedImage, HistoryEntry, MessageKind, PendingTask, SendTask,
    SessionState, StatusRecord, TaskId, TaskPayload, TaskState,
};
