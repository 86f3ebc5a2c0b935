//! Axum-based HTTP server.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::HeaderValue,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use mcpjam_core::{CreateConnectorParams, CreateStickyParams, MoveNodeParams, StartTimerParams};

use crate::dispatch::enqueue;
use crate::pull::pull;
use crate::state::GatewayState;

/// Build the router with every route, CORS and request tracing.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins());

    #[allow(unused_mut)]
    let mut app = Router::new()
        .route("/pull", get(pull))
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .route("/mcp/create_sticky", get(enqueue::<CreateStickyParams>))
        .route("/mcp/move_node", get(enqueue::<MoveNodeParams>))
        .route("/mcp/start_timer", get(enqueue::<StartTimerParams>))
        .route("/mcp/create_connector", get(enqueue::<CreateConnectorParams>));

    #[cfg(feature = "metrics")]
    if state.metrics.is_some() {
        app = app.route("/metrics", get(metrics_handler));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C.
pub async fn start_gateway(state: Arc<GatewayState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

/// The canvas plugin runs in a sandboxed iframe, so its requests carry
/// `Origin: null` and need credentials allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn ping_handler() -> impl IntoResponse {
    axum::Json(json!({ "pong": true }))
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");

    axum::Json(json!({
        "status": "ok",
        "version": version,
        "queued": state.source.len(),
    }))
}

#[cfg(feature = "metrics")]
async fn metrics_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    state
        .metrics
        .as_ref()
        .map(|handle| crate::metrics::render(handle, state.source.len()))
        .unwrap_or_default()
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(%e, "Failed to install Ctrl-C handler; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
