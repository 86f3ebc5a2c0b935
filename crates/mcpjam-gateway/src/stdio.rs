//! MCP stdio server.
//!
//! Reads newline-delimited JSON-RPC 2.0 requests and writes one response
//! line per request. Notifications run but get no response. Runs until EOF.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info, warn};

use mcpjam_core::CommandSink;
use mcpjam_core::protocol::{JSONRPC_VERSION, RpcError, RpcRequest, RpcResponse};
use mcpjam_tools::{ToolContext, ToolRegistry, register_builtin_tools};

use crate::methods::handle_request;

/// Tool registry plus the context every tool call runs with.
pub struct McpServer {
    pub tools: Arc<ToolRegistry>,
    pub context: ToolContext,
}

impl McpServer {
    pub fn new(tools: Arc<ToolRegistry>, sink: Arc<dyn CommandSink>) -> Self {
        Self {
            tools,
            context: ToolContext::new(sink),
        }
    }

    /// Server exposing the four canvas tools.
    pub fn with_builtin_tools(sink: Arc<dyn CommandSink>) -> Self {
        let mut tools = ToolRegistry::new();
        register_builtin_tools(&mut tools);
        Self::new(Arc::new(tools), sink)
    }
}

/// Serve JSON-RPC over this process's stdin/stdout.
pub async fn run_stdio_server(server: &McpServer) -> anyhow::Result<()> {
    run_with_io(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve JSON-RPC over any reader/writer pair.
pub async fn run_with_io<R, W>(server: &McpServer, reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(tools = ?server.tools.list(), "MCP stdio server started");

    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(writer);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }
        debug!(request = %String::from_utf8_lossy(line), "MCP request");

        if let Some(response) = process_line(server, line).await {
            write_response(&mut writer, &response).await?;
        }
    }

    info!("MCP stdio server stopped (stdin closed)");
    Ok(())
}

/// Handle one raw input line. Returns `None` for notifications.
async fn process_line(server: &McpServer, line: &[u8]) -> Option<RpcResponse> {
    let value: Value = match serde_json::from_slice(line) {
        Ok(v) => v,
        Err(e) => {
            warn!(%e, "Failed to parse JSON-RPC message");
            return Some(RpcResponse::error(
                Value::Null,
                RpcError::parse_error(format!("Invalid JSON: {e}")),
            ));
        }
    };

    // Keep whatever id we can find so even a malformed request is answerable.
    let fallback_id = value.get("id").cloned().unwrap_or(Value::Null);

    let request: RpcRequest = match serde_json::from_value(value) {
        Ok(req) => req,
        Err(e) => {
            warn!(%e, "Malformed JSON-RPC request");
            return Some(RpcResponse::error(
                fallback_id,
                RpcError::invalid_request(e.to_string()),
            ));
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return Some(RpcResponse::error(
            fallback_id,
            RpcError::invalid_request(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
        ));
    }

    let Some(id) = request.id.clone() else {
        handle_notification(server, request).await;
        return None;
    };

    let response = match handle_request(server, &request.method, request.params).await {
        Ok(result) => RpcResponse::success(id, result),
        Err(error) => {
            warn!(method = %request.method, code = error.code, message = %error.message, "MCP request failed");
            RpcResponse::error(id, error)
        }
    };
    Some(response)
}

/// Notifications get no reply, but a method call sent as one still runs.
async fn handle_notification(server: &McpServer, request: RpcRequest) {
    if request.method.starts_with("notifications/") {
        debug!(method = %request.method, "MCP notification");
        return;
    }

    match handle_request(server, &request.method, request.params).await {
        Ok(_) => debug!(method = %request.method, "MCP notification handled"),
        Err(error) => {
            warn!(method = %request.method, code = error.code, message = %error.message, "MCP notification failed")
        }
    }
}

async fn write_response<W>(writer: &mut BufWriter<W>, response: &RpcResponse) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
