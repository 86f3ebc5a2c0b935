//! Prometheus metrics recording and endpoint.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus metrics recorder and return the handle for rendering.
pub fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

/// Record an accepted command on the given transport ("http" or "rpc").
pub fn record_enqueue(op: &str, transport: &str) {
    let labels = [("op", op.to_string()), ("transport", transport.to_string())];
    metrics::counter!("commands_enqueued_total", &labels).increment(1);
}

/// Record a call rejected by validation.
pub fn record_rejected(op: &str, transport: &str) {
    let labels = [("op", op.to_string()), ("transport", transport.to_string())];
    metrics::counter!("validation_rejected_total", &labels).increment(1);
}

/// Record commands handed to the polling consumer.
pub fn record_pulled(count: usize) {
    metrics::counter!("commands_pulled_total").increment(count as u64);
}

/// Record the current queue depth.
pub fn record_depth(depth: usize) {
    metrics::gauge!("queue_depth").set(depth as f64);
}

/// Render the exposition text. The depth gauge is sampled here, at scrape
/// time, so enqueues from either transport are reflected.
pub fn render(handle: &PrometheusHandle, depth: usize) -> String {
    record_depth(depth);
    handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_recorder_renders_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_enqueue("create_sticky", "http");
            record_pulled(3);
            record_depth(7);
        });

        let output = handle.render();
        assert!(output.contains("commands_enqueued_total"), "{output}");
        assert!(output.contains("commands_pulled_total"));
        assert!(output.contains("queue_depth 7"));
    }

    #[test]
    fn test_render_samples_queue_depth() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let output = metrics::with_local_recorder(&recorder, || {
            record_enqueue("start_timer", "rpc");
            render(&handle, 3)
        });
        assert!(output.contains("queue_depth 3"), "{output}");

        let output = metrics::with_local_recorder(&recorder, || render(&handle, 0));
        assert!(output.contains("queue_depth 0"), "{output}");
    }

    #[test]
    fn test_record_without_recorder_does_not_panic() {
        // The metrics crate falls back to a no-op recorder.
        record_rejected("start_timer", "rpc");
        record_depth(0);
    }
}
