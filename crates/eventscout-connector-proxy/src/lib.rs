//! Embedded proxy aggregating remote MCP endpoints behind one local surface.
//!
//! The original deployment wires three remote tool providers — two Apify
//! actors and Exa search — into a single MCP server. This crate exposes
//! them at POST /mcp: `tools/list` merges the upstream tool lists under
//! prefixed names, `tools/call` routes to the owning upstream, and the
//! handshake methods are answered locally so the proxy stays stateless.

pub mod models;
pub mod server;

pub use models::{ConnectorConfig, Upstream};

use axum::routing::post;
use axum::Router;
use server::{mcp_handler, AppState};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Start the proxy with the configured upstream registry.
///
/// Returns the port number the server is listening on. The server runs as
/// a background tokio task and is dropped when the process exits.
pub async fn start_proxy_server(config: ConnectorConfig) -> anyhow::Result<u16> {
    let upstreams = config.upstreams();
    start_with_upstreams(&config.host, config.port, config.timeout_secs, upstreams).await
}

/// Start the proxy with an explicit upstream registry. Bind port 0 to let
/// the OS pick one (used by the integration tests).
pub async fn start_with_upstreams(
    host: &str,
    port: u16,
    timeout_secs: u64,
    upstreams: Vec<Upstream>,
) -> anyhow::Result<u16> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    let state = AppState {
        upstreams: Arc::new(upstreams),
        http_client,
    };

    let app = Router::new().route("/mcp", post(mcp_handler)).with_state(state);

    let listener = TcpListener::bind((host, port)).await?;
    let port = listener.local_addr()?.port();

    info!("Connector proxy started on {}:{}", host, port);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Connector proxy server error: {}", e);
        }
    });

    Ok(port)
}
