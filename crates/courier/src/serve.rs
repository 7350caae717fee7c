// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier serve` command implementation.
//!
//! Wires the bridge transport, session monitor and dispatch queue together,
//! then serves the HTTP gateway until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use courier_bridge::BridgeTransport;
use courier_config::CourierConfig;
use courier_config::model::{BridgeConfig, QueueConfig, ServerConfig};
use courier_core::{CourierError, ImageFetcher, Transport};
use courier_dispatch::{
    DispatchQueue, HistoryStore, HttpImageFetcher, PacingPolicy, SessionMonitor, StatusTable,
};
use courier_gateway::{AuthConfig, GatewayState};

use crate::shutdown;

/// Library crates whose events the default filter admits at the configured level.
const LOG_TARGETS: &[&str] = &[
    "courier",
    "courier_bridge",
    "courier_config",
    "courier_core",
    "courier_dispatch",
    "courier_gateway",
];

/// Runs the `courier serve` command.
pub async fn run_serve(config: CourierConfig) -> Result<(), CourierError> {
    init_tracing(&config.logging.level);

    let transport: Arc<dyn Transport> =
        Arc::new(BridgeTransport::new(bridge_config(&config.bridge))?);
    let fetcher: Arc<dyn ImageFetcher> =
        Arc::new(HttpImageFetcher::new(config.queue.fetch_timeout())?);

    let queue = Arc::new(DispatchQueue::new(
        Arc::clone(&transport),
        fetcher,
        Arc::new(StatusTable::new()),
        Arc::new(HistoryStore::new(config.queue.history_capacity)),
        pacing_policy(&config.queue),
    ));
    let session = Arc::new(SessionMonitor::new());

    let cancel = shutdown::install_signal_handler();

    // Subscribe before connecting so the first pairing code is not missed.
    let monitor = session.spawn(transport.subscribe(), cancel.clone());
    let worker = queue.spawn_worker(cancel.clone())?;

    if let Err(e) = transport.connect().await {
        warn!(error = %e, "initial session start failed, the poller keeps retrying");
    }

    if config.server.bearer_token.is_none() {
        warn!("no server.bearer_token configured, protected routes will reject every request");
    }
    let auth = AuthConfig {
        bearer_token: config.server.bearer_token.clone(),
    };
    let state = GatewayState::new(
        Arc::clone(&queue),
        session,
        Arc::clone(&transport),
        auth,
    );

    info!(
        host = config.server.host.as_str(),
        port = config.server.port,
        min_delay_secs = config.queue.min_delay_secs,
        max_delay_secs = config.queue.max_delay_secs,
        "courier starting"
    );

    let served =
        courier_gateway::start_server(&server_config(&config.server), state, cancel.clone()).await;

    // The server may have failed on its own; stop everything else too.
    cancel.cancel();
    if let Err(e) = worker.await {
        warn!(error = %e, "dispatch worker ended abnormally");
    }
    if let Err(e) = monitor.await {
        warn!(error = %e, "session monitor ended abnormally");
    }

    let pending = queue.len();
    if pending > 0 {
        warn!(pending, "discarding undelivered tasks on shutdown");
    }

    if let Err(e) = transport.shutdown().await {
        warn!(error = %e, "transport shutdown failed");
    }

    info!("courier stopped");
    served
}

fn bridge_config(config: &BridgeConfig) -> courier_bridge::BridgeConfig {
    courier_bridge::BridgeConfig {
        base_url: config.base_url.clone(),
        token: config.token.clone(),
        poll_interval: Duration::from_secs(config.poll_interval_secs),
        max_backoff: Duration::from_secs(config.max_backoff_secs),
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    }
}

fn server_config(config: &ServerConfig) -> courier_gateway::ServerConfig {
    courier_gateway::ServerConfig {
        host: config.host.clone(),
        port: config.port,
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    }
}

fn pacing_policy(config: &QueueConfig) -> PacingPolicy {
    PacingPolicy {
        min_delay: config.min_delay(),
        max_delay: config.max_delay(),
        typing_min: config.typing_delay_min(),
        typing_max: config.typing_delay_max(),
    }
}

fn default_filter(log_level: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Initializes the tracing subscriber; `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
