//! Tool handlers for the RPC transport.
//!
//! Each canvas operation is exposed as a tool. A tool validates its JSON
//! arguments, enqueues the resulting command, and answers `"queued"`.
//! Every tool implements the [`Tool`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mcpjam_core::CommandSink;

pub mod canvas;

pub use canvas::CanvasCommandTool;

/// Acknowledgement returned by every accepted canvas tool call.
pub const QUEUED: &str = "queued";

/// Context provided to tools during execution.
#[derive(Clone)]
pub struct ToolContext {
    pub sink: Arc<dyn CommandSink>,
}

impl ToolContext {
    pub fn new(sink: Arc<dyn CommandSink>) -> Self {
        Self { sink }
    }
}

/// Output from a tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// The core tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as exposed to clients (e.g., "create_sticky").
    fn name(&self) -> &str;

    /// JSON Schema describing the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Execute the tool with the given parameters.
    ///
    /// Invalid arguments are reported as an error [`ToolOutput`], not as `Err`.
    async fn execute(
        &self,
        params: serde_json::Value,
        context: &ToolContext,
    ) -> anyhow::Result<ToolOutput>;
}

/// Registry of available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Tool definitions in the shape MCP `tools/list` returns.
    pub fn to_mcp_tools(&self) -> Vec<serde_json::Value> {
        self.tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "description": t.description(),
                    "inputSchema": t.parameters_schema(),
                })
            })
            .collect()
    }
}

/// Register the four canvas command tools.
pub fn register_builtin_tools(registry: &mut ToolRegistry) {
    for tool in canvas::canvas_tools() {
        registry.register(Box::new(tool));
    }
}
