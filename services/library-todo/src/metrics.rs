//! Prometheus metrics exposition
//!
//! - `library_refresh_total` (counter): label `outcome`, recorded by the
//!   refresh coordinator
//! - `library_records` (gauge): label `list`, recorded by the coordinator
//! - `library_credential_updates_total` (counter): label `result`

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record a credential update attempt. `result` is `updated` or a form
/// error key.
pub fn record_credential_update(result: &'static str) {
    metrics::counter!("library_credential_updates_total", "result" => result).increment(1);
}
