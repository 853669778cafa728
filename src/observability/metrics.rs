//! Metrics collection and exposition.
//!
//! # Metrics
//! - `eth_proxy_api_calls_per_node_total` (counter): attempts dispatched, by node
//! - `eth_proxy_upstream_failures_total` (counter): failed attempts, by node and kind
//! - `eth_proxy_node_healthy` (gauge): 1=healthy, 0=unhealthy, by node
//! - `eth_proxy_cache_hits_total` (counter): queries answered from cache
//! - `eth_proxy_balance_requests_total` (counter): queries by outcome
//!
//! Recording is a no-op until [`install`] sets the global recorder, which
//! keeps tests free of exporter setup.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder. Can only succeed once per process.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

pub fn record_dispatch(node: &str) {
    metrics::counter!("eth_proxy_api_calls_per_node_total", "node" => node.to_owned()).increment(1);
}

pub fn record_upstream_failure(node: &str, kind: &'static str) {
    metrics::counter!(
        "eth_proxy_upstream_failures_total",
        "node" => node.to_owned(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_node_health(node: &str, healthy: bool) {
    metrics::gauge!("eth_proxy_node_healthy", "node" => node.to_owned())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_cache_hit() {
    metrics::counter!("eth_proxy_cache_hits_total").increment(1);
}

pub fn record_balance_request(outcome: &'static str) {
    metrics::counter!("eth_proxy_balance_requests_total", "outcome" => outcome).increment(1);
}
