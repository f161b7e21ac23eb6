//! Axum handler aggregating remote MCP endpoints behind one JSON-RPC surface.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{JsonRpcRequest, Upstream};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub upstreams: Arc<Vec<Upstream>>,
    pub http_client: reqwest::Client,
}

/// POST /mcp handler.
pub async fn mcp_handler(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    // Notifications carry no id; acknowledge without forwarding.
    let Some(id) = request.id.clone() else {
        return StatusCode::ACCEPTED.into_response();
    };

    match request.method.as_str() {
        "initialize" => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": "eventscout-connector",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            },
        }))
        .into_response(),
        "ping" => Json(json!({"jsonrpc": "2.0", "id": id, "result": {}})).into_response(),
        "tools/list" => handle_tools_list(&state, id).await,
        "tools/call" => handle_tools_call(&state, id, request.params).await,
        other => error_response(id, -32601, format!("Method not found: {other}")),
    }
}

/// Fan out to every upstream and merge their tool lists under prefixed
/// names. A failing upstream degrades the merge instead of failing it.
async fn handle_tools_list(state: &AppState, id: Value) -> Response {
    let mut tools = Vec::new();

    for upstream in state.upstreams.iter() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": id.clone(),
            "method": "tools/list",
            "params": {},
        });

        match forward(state, upstream, &body).await {
            Ok(response) => {
                let upstream_tools = response
                    .pointer("/result/tools")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();

                info!(
                    "imported {} tools from upstream {}",
                    upstream_tools.len(),
                    upstream.prefix
                );

                for mut tool in upstream_tools {
                    if let Some(name) = tool.get("name").and_then(Value::as_str) {
                        let prefixed = upstream.prefixed(name);
                        tool["name"] = Value::String(prefixed);
                        tools.push(tool);
                    }
                }
            }
            Err(error) => {
                warn!("upstream {} failed during tools/list: {error:#}", upstream.prefix);
            }
        }
    }

    Json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {"tools": tools},
    }))
    .into_response()
}

/// Route a call to the upstream owning the prefixed tool name, forwarding
/// the stripped name verbatim and passing the upstream response through.
async fn handle_tools_call(state: &AppState, id: Value, params: Option<Value>) -> Response {
    let mut params = params.unwrap_or_else(|| json!({}));
    let Some(name) = params.get("name").and_then(Value::as_str).map(String::from) else {
        return error_response(id, -32602, "Missing tool name".to_string());
    };

    let Some((upstream, stripped)) = state.upstreams.iter().find_map(|upstream| {
        upstream
            .strip(&name)
            .map(|stripped| (upstream, stripped.to_string()))
    }) else {
        return error_response(id, -32601, format!("Tool not found: {name}"));
    };

    params["name"] = Value::String(stripped);
    let body = json!({
        "jsonrpc": "2.0",
        "id": id.clone(),
        "method": "tools/call",
        "params": params,
    });

    match forward(state, upstream, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(error) => {
            warn!("upstream {} failed during tools/call: {error:#}", upstream.prefix);
            error_response(
                id,
                -32603,
                format!("Upstream {} request failed", upstream.prefix),
            )
        }
    }
}

async fn forward(state: &AppState, upstream: &Upstream, body: &Value) -> anyhow::Result<Value> {
    let mut request = state
        .http_client
        .post(&upstream.url)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(body);
    if let Some(bearer) = &upstream.bearer {
        request = request.bearer_auth(bearer);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("upstream {} returned status {}", upstream.prefix, status);
    }

    Ok(response.json().await?)
}

fn error_response(id: Value, code: i64, message: String) -> Response {
    Json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message},
    }))
    .into_response()
}
