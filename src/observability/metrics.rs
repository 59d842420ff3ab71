//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by kind and outcome
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency by kind
//! - `gateway_rpc_duration_seconds` (histogram): RPC turnaround by outcome
//! - `gateway_in_flight_requests` (gauge): requests currently being processed
//! - `gateway_health_status` (gauge): 1=GREEN, 0=YELLOW
//!
//! Recording is a no-op until a recorder is installed, so library users and tests
//! pay nothing when the exporter is off.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::HealthStatus;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter listening");
            record_health(HealthStatus::Green);
        }
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(kind: &'static str, outcome: &'static str, start: Instant) {
    counter!("gateway_requests_total", "kind" => kind, "outcome" => outcome).increment(1);
    histogram!("gateway_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rpc(success: bool, start: Instant) {
    let outcome = if success { "success" } else { "failure" };
    histogram!("gateway_rpc_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_in_flight(count: u64) {
    gauge!("gateway_in_flight_requests").set(count as f64);
}

pub fn record_health(status: HealthStatus) {
    let value = match status {
        HealthStatus::Green => 1.0,
        HealthStatus::Yellow => 0.0,
    };
    gauge!("gateway_health_status").set(value);
}
