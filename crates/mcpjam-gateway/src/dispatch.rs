//! HTTP dispatch endpoints: `GET /mcp/{op}`.
//!
//! Query parameters are deserialized straight into the operation's
//! parameter record, so a missing or mistyped field is rejected before
//! anything is enqueued.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde_json::{Value, json};
use tracing::{debug, warn};

use mcpjam_core::CommandParams;

use crate::error::ApiError;
use crate::state::GatewayState;

/// Handler for any canvas operation; instantiated once per route.
pub async fn enqueue<P: CommandParams>(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<P>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = query.map_err(|rejection| {
        warn!(op = %P::OP, error = %rejection.body_text(), "Rejected HTTP dispatch");
        #[cfg(feature = "metrics")]
        crate::metrics::record_rejected(P::OP.as_str(), "http");
        ApiError::from(rejection)
    })?;

    state.sink.enqueue(params.into());
    debug!(op = %P::OP, "HTTP dispatch queued");

    #[cfg(feature = "metrics")]
    crate::metrics::record_enqueue(P::OP.as_str(), "http");

    Ok(Json(json!({ "result": "queued" })))
}
