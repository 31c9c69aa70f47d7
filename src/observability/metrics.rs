//! Metrics collection and exposition.
//!
//! # Metrics
//! - `panel_updates_total` (counter): configuration updates by outcome
//! - `panel_update_duration_seconds` (histogram): time spent in one update
//! - `panel_configured_slots` (gauge): slots configured after the last update
//! - `panel_http_requests_total` (counter): requests by method, status
//! - `panel_http_request_duration_seconds` (histogram): request latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed, so tests need no setup
//! - Prometheus exporter runs its own HTTP listener when enabled

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one configuration update.
pub fn record_update(outcome: &'static str, start: Instant) {
    metrics::counter!("panel_updates_total", "outcome" => outcome).increment(1);
    metrics::histogram!("panel_update_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_configured_slots(count: usize) {
    metrics::gauge!("panel_configured_slots").set(count as f64);
}

/// Record one HTTP request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "panel_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("panel_http_request_duration_seconds").record(start.elapsed().as_secs_f64());
}
