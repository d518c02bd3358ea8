//! Metrics collection for metric-relay-service.
//!
//! Everything goes through the `metrics` facade; the Prometheus recorder is
//! installed once at startup and rendered by `GET /metrics`.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "Failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("Metrics handle already initialized"))
    })
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Outcome of one notify call: `success`, `not_found` or `error`.
pub fn record_notification(outcome: &'static str) {
    counter!("relay_notifications_total", "outcome" => outcome).increment(1);
}

pub fn record_broadcast(event: &'static str) {
    counter!("relay_broadcasts_total", "event" => event).increment(1);
}

pub fn record_db_query(operation: &'static str, elapsed: Duration) {
    histogram!("relay_db_query_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}

pub fn record_subscribers(count: usize) {
    gauge!("relay_hub_subscribers").set(count as f64);
}
