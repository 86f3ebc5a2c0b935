//! Canvas command model.
//!
//! A [`Command`] is one queued canvas mutation. Callers never build commands
//! directly from loose input: each transport deserializes the matching
//! `*Params` record (which carries the required/optional field rules and
//! defaults) and converts it into a `Command`.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One canvas mutation, serialized with an `op` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Create a sticky note with the given text at (x, y).
    CreateSticky { text: String, x: i64, y: i64 },
    /// Move an existing node to (x, y).
    MoveNode { id: String, x: i64, y: i64 },
    /// Start the board timer.
    StartTimer { seconds: i64 },
    /// Connect two nodes. Without ids the consumer picks its own endpoints.
    CreateConnector {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_id: Option<String>,
    },
}

impl Command {
    pub fn op(&self) -> Op {
        match self {
            Self::CreateSticky { .. } => Op::CreateSticky,
            Self::MoveNode { .. } => Op::MoveNode,
            Self::StartTimer { .. } => Op::StartTimer,
            Self::CreateConnector { .. } => Op::CreateConnector,
        }
    }

    /// Validate JSON arguments for `op` and build the command.
    ///
    /// `null` arguments are treated as an empty object so that operations
    /// without required fields can be invoked bare.
    pub fn from_args(op: Op, args: serde_json::Value) -> Result<Self, ValidationError> {
        let args = if args.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            args
        };

        match op {
            Op::CreateSticky => parse::<CreateStickyParams>(args),
            Op::MoveNode => parse::<MoveNodeParams>(args),
            Op::StartTimer => parse::<StartTimerParams>(args),
            Op::CreateConnector => parse::<CreateConnectorParams>(args),
        }
    }
}

fn parse<P: CommandParams>(args: serde_json::Value) -> Result<Command, ValidationError> {
    serde_json::from_value::<P>(args)
        .map(Into::into)
        .map_err(|e| ValidationError::invalid(P::OP.as_str(), e.to_string()))
}

/// Operation names, as used in the `op` tag, HTTP paths, and tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CreateSticky,
    MoveNode,
    StartTimer,
    CreateConnector,
}

impl Op {
    pub const ALL: [Op; 4] = [
        Op::CreateSticky,
        Op::MoveNode,
        Op::StartTimer,
        Op::CreateConnector,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateSticky => "create_sticky",
            Self::MoveNode => "move_node",
            Self::StartTimer => "start_timer",
            Self::CreateConnector => "create_connector",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownOp(s.to_string()))
    }
}

// --- Parameter records ---

/// A validated argument record for one operation.
///
/// Transports deserialize the record from their own encoding (query string,
/// JSON arguments) and convert it into a [`Command`].
pub trait CommandParams: DeserializeOwned + Into<Command> + Send + 'static {
    const OP: Op;
}

impl CommandParams for CreateStickyParams {
    const OP: Op = Op::CreateSticky;
}

impl CommandParams for MoveNodeParams {
    const OP: Op = Op::MoveNode;
}

impl CommandParams for StartTimerParams {
    const OP: Op = Op::StartTimer;
}

impl CommandParams for CreateConnectorParams {
    const OP: Op = Op::CreateConnector;
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStickyParams {
    pub text: String,
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveNodeParams {
    pub id: String,
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartTimerParams {
    pub seconds: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateConnectorParams {
    #[serde(default)]
    pub start_id: Option<String>,
    #[serde(default)]
    pub end_id: Option<String>,
}

impl From<CreateStickyParams> for Command {
    fn from(p: CreateStickyParams) -> Self {
        Self::CreateSticky {
            text: p.text,
            x: p.x,
            y: p.y,
        }
    }
}

impl From<MoveNodeParams> for Command {
    fn from(p: MoveNodeParams) -> Self {
        Self::MoveNode {
            id: p.id,
            x: p.x,
            y: p.y,
        }
    }
}

impl From<StartTimerParams> for Command {
    fn from(p: StartTimerParams) -> Self {
        Self::StartTimer { seconds: p.seconds }
    }
}

impl From<CreateConnectorParams> for Command {
    fn from(p: CreateConnectorParams) -> Self {
        Self::CreateConnector {
            start_id: p.start_id,
            end_id: p.end_id,
        }
    }
}
