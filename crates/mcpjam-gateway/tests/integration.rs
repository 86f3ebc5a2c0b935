//! Gateway integration tests: start a real HTTP server and drive it with reqwest.
//!
//! Run with: `cargo test -p mcpjam-gateway --test integration`

use std::sync::Arc;

use mcpjam_core::CommandQueue;
use mcpjam_core::CommandSource;
use mcpjam_core::config::Config;
use mcpjam_gateway::McpServer;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Find an available port.
fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Start a gateway in the background and return its queue and base URL.
async fn start_test_gateway() -> (Arc<CommandQueue>, String) {
    let queue = Arc::new(CommandQueue::new());
    let base = start_gateway_on(queue.clone()).await;
    (queue, base)
}

/// Start a gateway serving `queue` and return its base URL.
async fn start_gateway_on(queue: Arc<CommandQueue>) -> String {
    let port = find_free_port();
    let state = Arc::new(mcpjam_gateway::GatewayState::new(
        Arc::new(Config::default()),
        queue,
    ));

    tokio::spawn(async move {
        let _ = mcpjam_gateway::start_gateway(state, "127.0.0.1", port).await;
    });

    let base = format!("http://127.0.0.1:{port}");

    // Wait for gateway to be ready
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if reqwest::get(format!("{base}/ping")).await.is_ok() {
            break;
        }
    }

    base
}

async fn get_json(url: String) -> (reqwest::StatusCode, Value) {
    let resp = reqwest::get(url).await.expect("request failed");
    let status = resp.status();
    let body = resp.json().await.expect("body was not JSON");
    (status, body)
}

#[tokio::test]
async fn test_ping() {
    let (_queue, base) = start_test_gateway().await;

    let (status, body) = get_json(format!("{base}/ping")).await;
    assert!(status.is_success());
    assert_eq!(body, json!({"pong": true}));
}

#[tokio::test]
async fn test_health_reports_queue_depth() {
    let (_queue, base) = start_test_gateway().await;

    get_json(format!("{base}/mcp/start_timer?seconds=60")).await;

    let (status, body) = get_json(format!("{base}/health")).await;
    assert!(status.is_success());
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
    assert_eq!(body["queued"], 1);
}

#[tokio::test]
async fn test_end_to_end_batches() {
    let (_queue, base) = start_test_gateway().await;

    let (status, body) = get_json(format!("{base}/mcp/create_sticky?text=hi&x=10&y=20")).await;
    assert!(status.is_success());
    assert_eq!(body, json!({"result": "queued"}));

    let (_, body) = get_json(format!("{base}/mcp/move_node?id=n1&x=5&y=5")).await;
    assert_eq!(body, json!({"result": "queued"}));

    let (_, first) = get_json(format!("{base}/pull?batch=1")).await;
    assert_eq!(
        first,
        json!([{"op": "create_sticky", "text": "hi", "x": 10, "y": 20}])
    );

    let (_, second) = get_json(format!("{base}/pull?batch=1")).await;
    assert_eq!(second, json!([{"op": "move_node", "id": "n1", "x": 5, "y": 5}]));

    let (_, third) = get_json(format!("{base}/pull")).await;
    assert_eq!(third, json!([]));
}

#[tokio::test]
async fn test_missing_text_rejected() {
    let (queue, base) = start_test_gateway().await;

    let (status, body) = get_json(format!("{base}/mcp/create_sticky?x=1&y=2")).await;
    assert_eq!(status, reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "invalid_params");
    assert!(body["error"]["message"].as_str().unwrap().contains("text"));
    assert_eq!(queue.len(), 0);
}

#[tokio::test]
async fn test_wrong_type_rejected() {
    let (queue, base) = start_test_gateway().await;

    let (status, _) = get_json(format!("{base}/mcp/start_timer?seconds=soon")).await;
    assert_eq!(status, reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = get_json(format!("{base}/mcp/move_node?id=n1&x=left")).await;
    assert_eq!(status, reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_connector_optional_ids() {
    let (_queue, base) = start_test_gateway().await;

    get_json(format!("{base}/mcp/create_connector")).await;
    get_json(format!("{base}/mcp/create_connector?start_id=a&end_id=b")).await;

    let (_, body) = get_json(format!("{base}/pull")).await;
    assert_eq!(
        body,
        json!([
            {"op": "create_connector"},
            {"op": "create_connector", "start_id": "a", "end_id": "b"}
        ])
    );
}

#[tokio::test]
async fn test_pull_default_batch_is_32() {
    let (queue, base) = start_test_gateway().await;

    for i in 0..40 {
        get_json(format!("{base}/mcp/start_timer?seconds={i}")).await;
    }

    let (_, body) = get_json(format!("{base}/pull")).await;
    let batch = body.as_array().unwrap();
    assert_eq!(batch.len(), 32);
    assert_eq!(batch[0]["seconds"], 0);
    assert_eq!(batch[31]["seconds"], 31);
    assert_eq!(queue.len(), 8);
}

#[tokio::test]
async fn test_pull_negative_batch_returns_nothing() {
    let (queue, base) = start_test_gateway().await;

    get_json(format!("{base}/mcp/start_timer?seconds=5")).await;

    let (status, body) = get_json(format!("{base}/pull?batch=-1")).await;
    assert!(status.is_success());
    assert_eq!(body, json!([]));
    assert_eq!(queue.len(), 1);

    let (status, _) = get_json(format!("{base}/pull?batch=many")).await;
    assert_eq!(status, reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_concurrent_pulls_do_not_overlap() {
    let (_queue, base) = start_test_gateway().await;

    for i in 0..100 {
        get_json(format!("{base}/mcp/start_timer?seconds={i}")).await;
    }

    let pulls: Vec<_> = (0..10)
        .map(|_| {
            let url = format!("{base}/pull?batch=10");
            tokio::spawn(async move { get_json(url).await.1 })
        })
        .collect();

    let mut seen: Vec<i64> = Vec::new();
    for pull in futures::future::join_all(pulls).await {
        let body = pull.unwrap();
        seen.extend(
            body.as_array()
                .unwrap()
                .iter()
                .map(|c| c["seconds"].as_i64().unwrap()),
        );
    }

    seen.sort_unstable();
    assert_eq!(seen, (0..100).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_cors_allows_null_origin() {
    let (_queue, base) = start_test_gateway().await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/pull"))
        .header("Origin", "null")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("null")
    );
    assert_eq!(
        resp.headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn test_rpc_commands_drain_through_pull() {
    let queue = Arc::new(CommandQueue::new());
    let base = start_gateway_on(queue.clone()).await;
    let server = McpServer::with_builtin_tools(queue.clone());

    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"create_sticky","arguments":{"text":"hi","x":10,"y":20}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"start_timer","arguments":{"seconds":60}}}"#,
        "\n",
    );
    let (mut client, server_io) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    client.write_all(input.as_bytes()).await.unwrap();
    client.shutdown().await.unwrap();

    mcpjam_gateway::stdio::run_with_io(&server, server_read, server_write)
        .await
        .unwrap();

    let mut out = String::new();
    client.read_to_string(&mut out).await.unwrap();
    assert_eq!(out.lines().count(), 2);

    // HTTP dispatch lands in the same queue, behind the RPC calls.
    get_json(format!("{base}/mcp/move_node?id=n1&x=5&y=5")).await;

    let (_, body) = get_json(format!("{base}/pull")).await;
    assert_eq!(
        body,
        json!([
            {"op": "create_sticky", "text": "hi", "x": 10, "y": 20},
            {"op": "start_timer", "seconds": 60},
            {"op": "move_node", "id": "n1", "x": 5, "y": 5}
        ])
    );
    assert!(queue.is_empty());
}
