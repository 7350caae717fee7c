// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use courier_core::{
    CourierError, DeliveryOutcome, MessageKind, PendingTask, SendTask, SessionState,
    StatusRecord, TaskId,
};
use courier_dispatch::{DEFAULT_PAGE_LIMIT, HistoryFilter, HistoryPage, HistoryStats};

use crate::error::ApiError;
use crate::qr;
use crate::server::GatewayState;

/// Request body for the `sendMessage` routes.
#[derive(Debug, Default, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default, rename = "messageData")]
    pub message_data: Option<MessageData>,
}

/// Message fields; which ones are required depends on the route.
#[derive(Debug, Default, Deserialize)]
pub struct MessageData {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Response body for an accepted send.
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub task_id: TaskId,
    pub queue_position: usize,
}

/// Response body for session control routes.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Informational response for `/qr` when no page is shown.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub whatsapp_ready: bool,
    pub queue_size: usize,
    pub history_size: usize,
    pub session_state: SessionState,
    pub uptime_secs: u64,
    pub version: &'static str,
}

/// Response body for GET /queue/status.
#[derive(Debug, Serialize)]
pub struct QueueStatusResponse {
    pub queue_size: usize,
    pub total_tasks: usize,
    pub draining: bool,
    pub tasks: BTreeMap<String, StatusRecord>,
}

/// Response body for GET /queue/list.
#[derive(Debug, Serialize)]
pub struct QueueListResponse {
    pub queue_size: usize,
    pub tasks: Vec<PendingTask>,
}

/// Query string for GET /history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl HistoryQuery {
    fn filter(&self) -> Result<HistoryFilter, ApiError> {
        Ok(HistoryFilter {
            outcome: parse_filter::<DeliveryOutcome>(self.status.as_deref(), "status")?,
            kind: parse_filter::<MessageKind>(self.kind.as_deref(), "type")?,
        })
    }
}

/// Empty values mean "no filter"; anything else must parse.
fn parse_filter<T: FromStr>(raw: Option<&str>, name: &str) -> Result<Option<T>, ApiError> {
    match raw.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| {
                ApiError::from(CourierError::Validation(format!(
                    "unknown {name} filter `{value}`"
                )))
            }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn ensure_ready(state: &GatewayState) -> Result<(), CourierError> {
    if state.transport.is_ready() {
        Ok(())
    } else {
        Err(CourierError::NotReady)
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        whatsapp_ready: state.transport.is_ready(),
        queue_size: state.queue.len(),
        history_size: state.history.len(),
        session_state: state.session.state(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /qr
///
/// Renders the pairing page while a code is pending.
pub async fn get_qr(State(state): State<GatewayState>) -> Result<Response, ApiError> {
    if state.transport.is_ready() {
        return Ok(Json(MessageResponse {
            message: "already connected",
        })
        .into_response());
    }

    match state.session.pairing_code() {
        None => Ok(Json(MessageResponse {
            message: "waiting for QR code",
        })
        .into_response()),
        Some(code) => Ok(Html(qr::pairing_page(&code)?).into_response()),
    }
}

/// POST /rest/sendMessage/{instance}/text
pub async fn post_send_text(
    State(state): State<GatewayState>,
    Path(instance): Path<String>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<QueuedResponse>, ApiError> {
    ensure_ready(&state)?;
    let Json(body) = body?;
    let data = body.message_data.unwrap_or_default();

    let (Some(to), Some(text)) = (non_empty(data.to), non_empty(data.text)) else {
        return Err(
            CourierError::Validation(r#"fields "to" and "text" are required"#.into()).into(),
        );
    };

    let task = SendTask::text(to, text);
    let task_id = task.id.clone();
    let position = state.queue.enqueue(task);
    tracing::debug!(instance = instance.as_str(), task_id = %task_id, "text message accepted");

    Ok(Json(QueuedResponse {
        status: "success",
        message: "message queued",
        task_id,
        queue_position: position,
    }))
}

/// POST /rest/sendMessage/{instance}/image
pub async fn post_send_image(
    State(state): State<GatewayState>,
    Path(instance): Path<String>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<QueuedResponse>, ApiError> {
    ensure_ready(&state)?;
    let Json(body) = body?;
    let data = body.message_data.unwrap_or_default();

    let (Some(to), Some(image_url)) = (non_empty(data.to), non_empty(data.image_url)) else {
        return Err(
            CourierError::Validation(r#"fields "to" and "imageUrl" are required"#.into()).into(),
        );
    };

    let task = SendTask::image(to, image_url, non_empty(data.caption));
    let task_id = task.id.clone();
    let position = state.queue.enqueue(task);
    tracing::debug!(instance = instance.as_str(), task_id = %task_id, "image message accepted");

    Ok(Json(QueuedResponse {
        status: "success",
        message: "image queued",
        task_id,
        queue_position: position,
    }))
}

/// GET /queue/status/{task_id}
pub async fn get_task_status(
    State(state): State<GatewayState>,
    Path(task_id): Path<String>,
) -> Result<Json<StatusRecord>, ApiError> {
    state
        .status
        .get(&task_id)
        .map(Json)
        .ok_or_else(|| ApiError::from(CourierError::NotFound("task id not found".into())))
}

/// GET /queue/status
pub async fn get_queue_status(State(state): State<GatewayState>) -> Json<QueueStatusResponse> {
    let tasks = state.status.snapshot();
    Json(QueueStatusResponse {
        queue_size: state.queue.len(),
        total_tasks: tasks.len(),
        draining: state.queue.is_draining(),
        tasks,
    })
}

/// GET /queue/list
pub async fn get_queue_list(State(state): State<GatewayState>) -> Json<QueueListResponse> {
    let tasks = state.queue.list_pending();
    Json(QueueListResponse {
        queue_size: tasks.len(),
        tasks,
    })
}

/// GET /history
pub async fn get_history(
    State(state): State<GatewayState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryPage>, ApiError> {
    let Query(query) = query?;
    let filter = query.filter()?;
    Ok(Json(state.history.query(
        filter,
        query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        query.offset.unwrap_or(0),
    )))
}

/// GET /history/stats
pub async fn get_history_stats(State(state): State<GatewayState>) -> Json<HistoryStats> {
    Json(state.history.stats())
}

/// POST /reconnect
pub async fn post_reconnect(
    State(state): State<GatewayState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    tracing::info!("reconnect requested");
    state.transport.reconnect().await.map_err(|e| {
        tracing::error!(error = %e, "reconnect failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(SuccessResponse {
        status: "success",
        message: "reconnecting",
    }))
}

/// POST /reset-session
pub async fn post_reset_session(
    State(state): State<GatewayState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    tracing::info!("session reset requested");
    state.transport.reset_session().await.map_err(|e| {
        tracing::error!(error = %e, "session reset failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(SuccessResponse {
        status: "success",
        message: "session reset, scan the new QR code to pair",
    }))
}
