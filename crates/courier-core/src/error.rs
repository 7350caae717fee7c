// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Courier messaging gateway.

use thiserror::Error;

/// The primary error type used across all Courier traits and core operations.
#[derive(Debug, Error)]
pub enum CourierError {
    /// A request was rejected because a required field is absent or empty.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or mismatched credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The transport session cannot accept sends right now.
    #[error("transport is not ready")]
    NotReady,

    /// A lookup by id found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport adapter errors (send rejected, session call failed).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Downloading a remote media payload failed.
    #[error("fetch error: {message}")]
    Fetch {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A remote call gave up after `duration`.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CourierError {
    /// Shorthand for a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a fetch error without an underlying source.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            source: None,
        }
    }
}
