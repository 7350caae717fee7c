// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP image downloads for image send tasks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use courier_core::{CourierError, FetchedImage, ImageFetcher};

/// MIME type assumed when the response carries no usable `Content-Type`.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// [`ImageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpImageFetcher {
    /// Builds a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CourierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CourierError::Fetch {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, CourierError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CourierError::fetch(format!(
                "image download returned {status}"
            )));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(essence)
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.request_error(url, e))?;

        debug!(url, bytes = bytes.len(), mime_type = mime_type.as_str(), "image downloaded");
        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }
}

impl HttpImageFetcher {
    fn request_error(&self, url: &str, e: reqwest::Error) -> CourierError {
        if e.is_timeout() {
            return CourierError::Timeout {
                duration: self.timeout,
            };
        }
        CourierError::Fetch {
            message: format!("request to {url} failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

/// `image/png; charset=binary` → `image/png`. Empty values yield `None`.
fn essence(content_type: &str) -> Option<&str> {
    let essence = content_type.split(';').next()?.trim();
    (!essence.is_empty()).then_some(essence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpImageFetcher {
        HttpImageFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn essence_strips_parameters() {
        assert_eq!(essence("image/png; q=1"), Some("image/png"));
        assert_eq!(essence("image/gif"), Some("image/gif"));
        assert_eq!(essence("  ;x"), None);
    }

    #[tokio::test]
    async fn fetch_returns_body_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
            )
            .mount(&server)
            .await;

        let image = fetcher()
            .fetch(&format!("{}/cat.png", server.uri()))
            .await
            .unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_jpeg() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
            .mount(&server)
            .await;

        let image = fetcher().fetch(&server.uri()).await.unwrap();
        assert_eq!(image.mime_type, DEFAULT_IMAGE_MIME);
    }

    #[tokio::test]
    async fn slow_server_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = HttpImageFetcher::new(Duration::from_millis(100)).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert!(
            matches!(err, CourierError::Timeout { duration } if duration == Duration::from_millis(100)),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher().fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, CourierError::Fetch { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn unreachable_host_is_fetch_error() {
        let err = fetcher()
            .fetch("http://127.0.0.1:1/nothing.png")
            .await
            .unwrap_err();
        assert!(matches!(err, CourierError::Fetch { .. }));
    }
}
