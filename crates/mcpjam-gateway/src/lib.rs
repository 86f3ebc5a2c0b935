//! Transport front ends for the canvas command queue.
//!
//! Two independent surfaces share one queue:
//! - the HTTP server ([`server`]), which hosts the GET dispatch endpoints,
//!   the `/pull` endpoint the canvas plugin polls, and liveness probes;
//! - the stdio JSON-RPC server ([`stdio`]), which exposes the same
//!   operations as MCP tools.

pub mod dispatch;
pub mod error;
pub mod methods;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod pull;
pub mod server;
pub mod state;
pub mod stdio;

pub use server::{build_router, start_gateway};
pub use state::GatewayState;
pub use stdio::{McpServer, run_stdio_server};
