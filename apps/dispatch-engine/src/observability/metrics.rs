//! Prometheus metrics for the dispatch engine.
//!
//! Recording functions are safe to call without an installed recorder;
//! they become no-ops.

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::MetricsConfig;

/// Latency buckets from 1ms to 10s.
const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 10.0];

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the listen address is invalid or the exporter fails
/// to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .map_err(|e: std::net::AddrParseError| MetricsError::Configuration(e.to_string()))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets(LATENCY_BUCKETS)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(%addr, "Prometheus metrics exporter started");

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Dispatch Metrics
// ============================================================================

/// Record the outcome of a dispatch request.
///
/// # Arguments
///
/// * `outcome` - `OK` or an error code such as `NO_ONLINE_ACCOUNTS`
/// * `latency_seconds` - Time spent in the synchronous dispatch path
pub fn record_dispatch(outcome: &str, latency_seconds: f64) {
    counter!("dispatch_requests_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("dispatch_latency_seconds").record(latency_seconds);
}

/// Record a child order handed to the simulator.
pub fn record_child_created(broker: &str) {
    counter!("child_orders_created_total", "broker" => broker.to_string()).increment(1);
}

/// Record a child reaching a terminal status.
///
/// # Arguments
///
/// * `status` - `FILLED`, `REJECTED` or `CANCELLED`
/// * `reason` - Failure code, or `none`
pub fn record_child_terminal(status: &str, reason: &str) {
    counter!(
        "child_orders_terminal_total",
        "status" => status.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record one simulated fill.
pub fn record_fill(symbol: &str, qty: u64) {
    counter!("fills_total", "symbol" => symbol.to_string()).increment(1);
    counter!("filled_quantity_total", "symbol" => symbol.to_string()).increment(qty);
}

// ============================================================================
// Presence Metrics
// ============================================================================

/// Update the online accounts gauge.
pub fn update_online_accounts(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("online_accounts").set(count as f64);
}
