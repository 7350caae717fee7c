// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Courier dispatch queue.
//!
//! Send requests are validated and enqueued; delivery happens later on the
//! dispatch worker. The remaining routes expose queue, status, history and
//! session introspection plus session control.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod qr;
pub mod server;

pub use auth::AuthConfig;
pub use error::ApiError;
pub use server::{GatewayState, ServerConfig, build_router, start_server};
