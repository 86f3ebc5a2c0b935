//! Core types for MCPJam: the canvas command model, the command queue,
//! config, errors, and the JSON-RPC wire types.

pub mod command;
pub mod config;
pub mod error;
pub mod protocol;
pub mod queue;

pub use command::{
    Command, CommandParams, CreateConnectorParams, CreateStickyParams, MoveNodeParams, Op,
    StartTimerParams,
};
pub use queue::{CommandQueue, CommandSink, CommandSource};
