// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the sidecar API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::debug;

use courier_core::CourierError;

use crate::BridgeConfig;
use crate::protocol::{ErrorBody, MediaMessage, SessionStatus, TextMessage};

/// Thin wrapper over `reqwest` that knows the sidecar routes.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BridgeClient {
    pub fn new(config: &BridgeConfig) -> Result<Self, CourierError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CourierError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// `GET /session`
    pub async fn session(&self) -> Result<SessionStatus, CourierError> {
        let response = self.send(self.client.get(self.url("/session"))).await?;
        response.json().await.map_err(|e| CourierError::Transport {
            message: format!("invalid session status from bridge: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// `POST /session/{action}` for `start`, `restart`, `logout` and `stop`.
    pub async fn session_action(&self, action: &str) -> Result<(), CourierError> {
        debug!(action, "bridge session action");
        self.send(self.client.post(self.url(&format!("/session/{action}"))))
            .await
            .map(drop)
    }

    /// `POST /messages/text`
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), CourierError> {
        self.post_json("/messages/text", &TextMessage { chat_id, text })
            .await
    }

    /// `POST /messages/media`
    pub async fn send_media(
        &self,
        chat_id: &str,
        bytes: &[u8],
        mime_type: &str,
        caption: &str,
    ) -> Result<(), CourierError> {
        let body = MediaMessage {
            chat_id,
            mime_type,
            data: STANDARD.encode(bytes),
            caption,
        };
        self.post_json("/messages/media", &body).await
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), CourierError> {
        self.send(self.client.post(self.url(path)).json(body))
            .await
            .map(drop)
    }

    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CourierError> {
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| CourierError::Transport {
            message: format!("bridge request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(CourierError::transport(format!(
            "bridge returned {status}: {detail}"
        )))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
