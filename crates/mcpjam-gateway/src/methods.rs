//! JSON-RPC method handlers for the MCP stdio transport.

use serde_json::{Value, json};
use tracing::debug;

use mcpjam_core::protocol::{RpcError, SUPPORTED_PROTOCOL_VERSIONS};

use crate::stdio::McpServer;

const SERVER_NAME: &str = "mcpjam";
const INSTRUCTIONS: &str = "Stdio MCP server for FigJam plugin";

/// Dispatch a method request and return its result payload.
pub async fn handle_request(
    server: &McpServer,
    method: &str,
    params: Value,
) -> Result<Value, RpcError> {
    debug!(method, "Dispatching method");

    match method {
        "initialize" => Ok(handle_initialize(&params)),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": server.tools.to_mcp_tools() })),
        "tools/call" => handle_tools_call(server, params).await,
        _ => Err(RpcError::method_not_found(method)),
    }
}

/// Echo the client's protocol version when supported, otherwise offer the newest one.
fn handle_initialize(params: &Value) -> Value {
    let requested = params.get("protocolVersion").and_then(Value::as_str);
    let version = requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v))
        .copied()
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

    debug!(?requested, version, "MCP initialize");

    json!({
        "protocolVersion": version,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "capabilities": {
            "tools": { "listChanged": false },
        },
        "instructions": INSTRUCTIONS,
    })
}

/// `tools/call`: run a tool and wrap its output in MCP content blocks.
///
/// Argument validation failures come back as `isError: true` results, not
/// JSON-RPC errors; an unknown tool name is an invalid-params error.
async fn handle_tools_call(server: &McpServer, params: Value) -> Result<Value, RpcError> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params("Missing tool name"))?;

    let tool = server
        .tools
        .get(name)
        .ok_or_else(|| RpcError::invalid_params(format!("Unknown tool: {name}")))?;

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    let output = tool
        .execute(arguments, &server.context)
        .await
        .map_err(|e| RpcError::internal_error(e.to_string()))?;

    #[cfg(feature = "metrics")]
    if output.is_error {
        crate::metrics::record_rejected(name, "rpc");
    } else {
        crate::metrics::record_enqueue(name, "rpc");
    }

    Ok(json!({
        "content": [{ "type": "text", "text": output.content }],
        "isError": output.is_error,
    }))
}
