//! `GET /pull`: drain the oldest commands for the polling canvas plugin.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::debug;

use mcpjam_core::Command;

use crate::error::ApiError;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct PullParams {
    /// Maximum number of commands to return. Negative values return nothing.
    pub batch: Option<i64>,
}

pub async fn pull(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<PullParams>, QueryRejection>,
) -> Result<Json<Vec<Command>>, ApiError> {
    let Query(params) = query?;

    let batch = match params.batch {
        Some(n) => usize::try_from(n).unwrap_or(0),
        None => state.default_batch(),
    };

    let commands = state.source.pull(Some(batch));
    debug!(batch, returned = commands.len(), "Pull served");

    #[cfg(feature = "metrics")]
    crate::metrics::record_pulled(commands.len());

    Ok(Json(commands))
}
