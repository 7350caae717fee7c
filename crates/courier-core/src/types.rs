// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the dispatch queue, the transport adapters and the gateway.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Alphabet used for the random suffix of generated identifiers.
const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix of generated identifiers.
const ID_SUFFIX_LEN: usize = 9;

/// Unique identifier for a send task.
///
/// Formatted as `<unix-millis>-<9 base36 chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a fresh, time-based identifier with a random suffix.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("{}-{suffix}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Kind of outbound message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
}

/// What a send task carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskPayload {
    Text {
        text: String,
    },
    Image {
        image_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

impl TaskPayload {
    pub fn kind(&self) -> MessageKind {
        match self {
            TaskPayload::Text { .. } => MessageKind::Text,
            TaskPayload::Image { .. } => MessageKind::Image,
        }
    }
}

/// A single queued delivery. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTask {
    pub id: TaskId,
    /// Raw recipient identifier as supplied by the caller.
    pub recipient: String,
    pub payload: TaskPayload,
}

impl SendTask {
    /// Create a text task with a freshly generated id.
    pub fn text(recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: TaskId::generate(),
            recipient: recipient.into(),
            payload: TaskPayload::Text { text: text.into() },
        }
    }

    /// Create an image task with a freshly generated id.
    pub fn image(
        recipient: impl Into<String>,
        image_url: impl Into<String>,
        caption: Option<String>,
    ) -> Self {
        Self {
            id: TaskId::generate(),
            recipient: recipient.into(),
            payload: TaskPayload::Image {
                image_url: image_url.into(),
                caption,
            },
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }
}

/// Lifecycle state of a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskState {
    Queued,
    Processing,
    Sent,
    Error,
}

impl TaskState {
    /// Whether the state is final (`sent` or `error`).
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Sent | TaskState::Error)
    }
}

/// Mutable lifecycle record polled by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub task_id: TaskId,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(rename = "to")]
    pub recipient: String,
    #[serde(rename = "status")]
    pub state: TaskState,
    pub queued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Queue position at enqueue time (1-based).
    pub position: usize,
}

impl StatusRecord {
    /// A fresh `queued` record for `task`.
    pub fn queued(task: &SendTask, position: usize) -> Self {
        Self {
            task_id: task.id.clone(),
            kind: task.kind(),
            recipient: task.recipient.clone(),
            state: TaskState::Queued,
            queued_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
            position,
        }
    }
}

/// Summary of a pending task, as listed by the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTask {
    pub position: usize,
    pub task_id: TaskId,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(rename = "to")]
    pub recipient: String,
    pub queued_at: DateTime<Utc>,
}

/// Result of a delivery attempt as recorded in history.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryOutcome {
    Sent,
    Failed,
}

/// A resolved delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(rename = "to")]
    pub recipient: String,
    pub content: TaskPayload,
    #[serde(rename = "status")]
    pub outcome: DeliveryOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build the history entry for a resolved task.
    pub fn for_task(task: &SendTask, outcome: DeliveryOutcome, error: Option<String>) -> Self {
        Self {
            id: TaskId::generate().0,
            kind: task.kind(),
            recipient: task.recipient.clone(),
            content: task.payload.clone(),
            outcome,
            error,
            task_id: Some(task.id.clone()),
            timestamp: Utc::now(),
        }
    }
}

/// State of the chat session behind the transport.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    #[default]
    Disconnected,
    Pairing,
    Authenticated,
    Ready,
}

/// An image downloaded for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}
