//! Gateway shared state.

use std::sync::Arc;

use mcpjam_core::config::Config;
use mcpjam_core::{CommandQueue, CommandSink, CommandSource};

/// Shared state accessible from all HTTP handlers.
pub struct GatewayState {
    pub config: Arc<Config>,
    pub sink: Arc<dyn CommandSink>,
    pub source: Arc<dyn CommandSource>,
    #[cfg(feature = "metrics")]
    pub metrics: Option<metrics_exporter_prometheus::PrometheusHandle>,
}

impl GatewayState {
    /// Both sides of the state point at the same queue.
    pub fn new(config: Arc<Config>, queue: Arc<CommandQueue>) -> Self {
        Self {
            config,
            sink: queue.clone(),
            source: queue,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Attach a Prometheus handle so `/metrics` is served.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, handle: metrics_exporter_prometheus::PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Batch size `/pull` uses when the caller gives none.
    pub fn default_batch(&self) -> usize {
        self.config.default_batch()
    }
}
