//! Integration tests for the connector proxy.
//!
//! These tests spin up mock upstream MCP endpoints and the proxy, then send
//! JSON-RPC requests to the proxy and verify the aggregated responses.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use eventscout_connector_proxy::{start_with_upstreams, Upstream};

/// Mock upstream serving a fixed tool under a fixed name. Echoes the called
/// tool name back so routing can be asserted.
async fn mock_upstream_handler(
    State(tool_name): State<String>,
    Json(request): Json<Value>,
) -> Json<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    match request.get("method").and_then(Value::as_str) {
        Some("tools/list") => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {"tools": [
                {"name": tool_name, "description": "mock tool", "inputSchema": {"type": "object"}},
            ]},
        })),
        Some("tools/call") => {
            let called = request
                .pointer("/params/name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {"content": [{"type": "text", "text": format!("called {called}")}]},
            }))
        }
        other => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32601, "message": format!("unexpected method {other:?}")},
        })),
    }
}

async fn spawn_mock_upstream(tool_name: &str) -> String {
    let app = Router::new()
        .route("/", post(mock_upstream_handler))
        .with_state(tool_name.to_string());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

async fn spawn_proxy(upstreams: Vec<Upstream>) -> String {
    let port = start_with_upstreams("127.0.0.1", 0, 5, upstreams)
        .await
        .unwrap();
    format!("http://127.0.0.1:{port}/mcp")
}

fn upstream(prefix: &str, url: String) -> Upstream {
    Upstream {
        prefix: prefix.to_string(),
        url,
        bearer: None,
    }
}

async fn rpc(proxy_url: &str, body: Value) -> Value {
    reqwest::Client::new()
        .post(proxy_url)
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn initialize_is_answered_locally() {
    let proxy_url = spawn_proxy(vec![]).await;

    let response = rpc(
        &proxy_url,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;

    assert_eq!(
        response.pointer("/result/serverInfo/name").and_then(Value::as_str),
        Some("eventscout-connector")
    );
    assert_eq!(response.get("id"), Some(&json!(1)));
}

#[tokio::test]
async fn tools_list_merges_upstreams_with_prefixes() {
    let luma_url = spawn_mock_upstream("scrape_events").await;
    let exa_url = spawn_mock_upstream("web_search").await;
    let proxy_url = spawn_proxy(vec![
        upstream("apify_luma", luma_url),
        upstream("exa", exa_url),
    ])
    .await;

    let response = rpc(
        &proxy_url,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {}}),
    )
    .await;

    let names: Vec<&str> = response
        .pointer("/result/tools")
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .filter_map(|tool| tool.get("name").and_then(Value::as_str))
        .collect();

    assert_eq!(names, vec!["apify_luma_scrape_events", "exa_web_search"]);
}

#[tokio::test]
async fn tools_call_routes_to_owning_upstream() {
    let luma_url = spawn_mock_upstream("scrape_events").await;
    let exa_url = spawn_mock_upstream("web_search").await;
    let proxy_url = spawn_proxy(vec![
        upstream("apify_luma", luma_url),
        upstream("exa", exa_url),
    ])
    .await;

    let response = rpc(
        &proxy_url,
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "exa_web_search", "arguments": {"query": "rust meetups"}},
        }),
    )
    .await;

    // The upstream sees the stripped tool name.
    assert_eq!(
        response.pointer("/result/content/0/text").and_then(Value::as_str),
        Some("called web_search")
    );
}

#[tokio::test]
async fn unknown_tool_prefix_is_method_not_found() {
    let exa_url = spawn_mock_upstream("web_search").await;
    let proxy_url = spawn_proxy(vec![upstream("exa", exa_url)]).await;

    let response = rpc(
        &proxy_url,
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "nonexistent_tool", "arguments": {}},
        }),
    )
    .await;

    assert_eq!(
        response.pointer("/error/code").and_then(Value::as_i64),
        Some(-32601)
    );
}

#[tokio::test]
async fn dead_upstream_degrades_tools_list() {
    let exa_url = spawn_mock_upstream("web_search").await;
    let proxy_url = spawn_proxy(vec![
        // Nothing is listening here.
        upstream("apify_luma", "http://127.0.0.1:1/".to_string()),
        upstream("exa", exa_url),
    ])
    .await;

    let response = rpc(
        &proxy_url,
        json!({"jsonrpc": "2.0", "id": 5, "method": "tools/list", "params": {}}),
    )
    .await;

    let names: Vec<&str> = response
        .pointer("/result/tools")
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .filter_map(|tool| tool.get("name").and_then(Value::as_str))
        .collect();

    assert_eq!(names, vec!["exa_web_search"]);
}

#[tokio::test]
async fn notifications_are_acknowledged_without_forwarding() {
    let proxy_url = spawn_proxy(vec![]).await;

    let response = reqwest::Client::new()
        .post(&proxy_url)
        .json(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
}
