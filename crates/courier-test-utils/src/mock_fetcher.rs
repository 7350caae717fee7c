// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock image fetcher with canned responses.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use courier_core::{CourierError, FetchedImage, ImageFetcher};

enum Canned {
    Image(FetchedImage),
    Failure(String),
}

/// Serves registered images by URL. Unregistered URLs get a small JPEG-typed body.
pub struct MockImageFetcher {
    responses: Mutex<HashMap<String, Canned>>,
    requests: Mutex<Vec<String>>,
}

impl MockImageFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Register the body and MIME type served for `url`.
    pub fn with_image(&self, url: impl Into<String>, bytes: Vec<u8>, mime_type: &str) {
        self.responses.lock().unwrap_or_else(|p| p.into_inner()).insert(
            url.into(),
            Canned::Image(FetchedImage {
                bytes,
                mime_type: mime_type.to_string(),
            }),
        );
    }

    /// Make fetching `url` fail with `message`.
    pub fn fail_url(&self, url: impl Into<String>, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(url.into(), Canned::Failure(message.into()));
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, CourierError> {
        self.requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(url.to_string());

        match self
            .responses
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(url)
        {
            Some(Canned::Image(image)) => Ok(image.clone()),
            Some(Canned::Failure(message)) => Err(CourierError::fetch(message.clone())),
            None => Ok(FetchedImage {
                bytes: vec![0xFF, 0xD8, 0xFF],
                mime_type: "image/jpeg".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_registered_and_default_images() {
        let fetcher = MockImageFetcher::new();
        fetcher.with_image("http://x/a.png", vec![1], "image/png");
        fetcher.fail_url("http://x/missing", "status 404");

        assert_eq!(fetcher.fetch("http://x/a.png").await.unwrap().mime_type, "image/png");
        assert_eq!(fetcher.fetch("http://x/other").await.unwrap().mime_type, "image/jpeg");
        assert!(fetcher.fetch("http://x/missing").await.is_err());
        assert_eq!(fetcher.requests().len(), 3);
    }
}
