// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the gateway.
//!
//! Both traits use `#[async_trait]` for dynamic dispatch compatibility so the
//! dispatch queue can hold them as `Arc<dyn ...>`.

pub mod fetch;
pub mod transport;

pub use fetch::ImageFetcher;
pub use transport::{Transport, TransportEvent};
