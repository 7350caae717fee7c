// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Courier integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a real chat session.
//!
//! # Components
//!
//! - [`MockTransport`] - Mock chat transport with switchable readiness and captured sends
//! - [`MockImageFetcher`] - Mock image downloads with canned responses
//! - [`TestHarness`] - Dispatch queue plus gateway router wired to the mocks

pub mod harness;
pub mod mock_fetcher;
pub mod mock_transport;

pub use harness::{TEST_TOKEN, TestHarness, TestHarnessBuilder, TestResponse, wait_for};
pub use mock_fetcher::MockImageFetcher;
pub use mock_transport::{MockTransport, SentMessage};
