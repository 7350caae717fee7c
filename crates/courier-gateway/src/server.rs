// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use courier_core::{CourierError, Transport};
use courier_dispatch::{DispatchQueue, HistoryStore, SessionMonitor, StatusTable};

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub queue: Arc<DispatchQueue>,
    pub status: Arc<StatusTable>,
    pub history: Arc<HistoryStore>,
    pub session: Arc<SessionMonitor>,
    pub transport: Arc<dyn Transport>,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    /// Builds state around `queue`, sharing its status table and history.
    pub fn new(
        queue: Arc<DispatchQueue>,
        session: Arc<SessionMonitor>,
        transport: Arc<dyn Transport>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            status: Arc::clone(queue.status()),
            history: Arc::clone(queue.history()),
            queue,
            session,
            transport,
            auth,
            start_time: Instant::now(),
        }
    }
}

/// Gateway server configuration (mirrors `ServerConfig` from `courier-config`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

/// Builds the full router:
/// - public: `/health`, `/qr`, `/queue/*`, `/history*`
/// - bearer-protected: `/rest/sendMessage/{instance}/*`, `/reconnect`, `/reset-session`
pub fn build_router(state: GatewayState, request_timeout: Duration) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/qr", get(handlers::get_qr))
        .route("/queue/status", get(handlers::get_queue_status))
        .route("/queue/status/{task_id}", get(handlers::get_task_status))
        .route("/queue/list", get(handlers::get_queue_list))
        .route("/history", get(handlers::get_history))
        .route("/history/stats", get(handlers::get_history_stats))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/rest/sendMessage/{instance}/text",
            post(handlers::post_send_text),
        )
        .route(
            "/rest/sendMessage/{instance}/image",
            post(handlers::post_send_image),
        )
        .route("/reconnect", post(handlers::post_reconnect))
        .route("/reset-session", post(handlers::post_reset_session))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
}

/// Binds `host:port` and serves the gateway until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), CourierError> {
    let app = build_router(state, config.request_timeout);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CourierError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| CourierError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
