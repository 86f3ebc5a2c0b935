//! Canvas command tools: create_sticky, move_node, start_timer, create_connector.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use mcpjam_core::{Command, Op};

use crate::{QUEUED, Tool, ToolContext, ToolOutput};

/// One tool per canvas operation; the operation decides name, schema and validation.
pub struct CanvasCommandTool {
    op: Op,
}

impl CanvasCommandTool {
    pub fn new(op: Op) -> Self {
        Self { op }
    }

    pub fn op(&self) -> Op {
        self.op
    }
}

/// All canvas tools, in a stable order.
pub fn canvas_tools() -> Vec<CanvasCommandTool> {
    Op::ALL.into_iter().map(CanvasCommandTool::new).collect()
}

#[async_trait]
impl Tool for CanvasCommandTool {
    fn name(&self) -> &str {
        self.op.as_str()
    }

    fn description(&self) -> &str {
        match self.op {
            Op::CreateSticky => "Queue a sticky note with the given text at position (x, y) on the board.",
            Op::MoveNode => "Queue a move of an existing board node to position (x, y).",
            Op::StartTimer => "Queue a start of the board timer for the given number of seconds.",
            Op::CreateConnector => {
                "Queue a connector between two nodes. Without ids, the two most recently created stickies are connected."
            }
        }
    }

    fn parameters_schema(&self) -> serde_json::Value {
        match self.op {
            Op::CreateSticky => json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "The text on the sticky note" },
                    "x": { "type": "integer", "default": 0, "description": "The x position" },
                    "y": { "type": "integer", "default": 0, "description": "The y position" }
                },
                "required": ["text"]
            }),
            Op::MoveNode => json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "The ID of the node to move" },
                    "x": { "type": "integer", "default": 0, "description": "The new x position" },
                    "y": { "type": "integer", "default": 0, "description": "The new y position" }
                },
                "required": ["id"]
            }),
            Op::StartTimer => json!({
                "type": "object",
                "properties": {
                    "seconds": { "type": "integer", "description": "The timer duration in seconds" }
                },
                "required": ["seconds"]
            }),
            Op::CreateConnector => json!({
                "type": "object",
                "properties": {
                    "start_id": { "type": "string", "description": "Node the connector starts at" },
                    "end_id": { "type": "string", "description": "Node the connector ends at" }
                }
            }),
        }
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        context: &ToolContext,
    ) -> anyhow::Result<ToolOutput> {
        let cmd = match Command::from_args(self.op, params) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!(op = %self.op, error = %e, "Rejected tool call");
                return Ok(ToolOutput::error(format!("Error: {e}")));
            }
        };

        debug!(op = %self.op, "Tool call accepted");
        context.sink.enqueue(cmd);
        Ok(ToolOutput::ok(QUEUED))
    }
}
