use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub use metrics_exporter_prometheus::PrometheusHandle as MetricsHandle;

/// Install the process-wide Prometheus recorder and return its render handle.
///
/// Can only succeed once per process.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))
}

/// Handle to a recorder that is not installed globally. Renders an empty
/// exposition; used where the global recorder is already taken (tests, tools).
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
