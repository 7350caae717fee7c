// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image download capability used by the dispatch worker.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::types::FetchedImage;

/// Downloads the bytes of an image referenced by URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync + 'static {
    /// Fetches `url`, returning its body and MIME type.
    ///
    /// Implementations report network failures and non-success statuses as
    /// [`CourierError::Fetch`].
    async fn fetch(&self, url: &str) -> Result<FetchedImage, CourierError>;
}
