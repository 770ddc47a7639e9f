//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tsl_cache_lookups_total` (counter): cache lookups by `result` (hit/miss)
//! - `tsl_upstream_requests_total` (counter): upstream requests by `status`
//! - `tsl_upstream_request_duration_seconds` (histogram): upstream latency
//! - `tsl_retries_total` (counter): retried attempts
//! - `tsl_rate_limit_wait_seconds` (histogram): time spent waiting for a slot
//! - `tsl_lookups_total` (counter): batch user lookups by `outcome`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("tsl_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_upstream_request(status: &str, start: Instant) {
    counter!("tsl_upstream_requests_total", "status" => status.to_string()).increment(1);
    histogram!("tsl_upstream_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_retry() {
    counter!("tsl_retries_total").increment(1);
}

pub fn record_rate_limit_wait(wait: Duration) {
    histogram!("tsl_rate_limit_wait_seconds").record(wait.as_secs_f64());
}

pub fn record_lookup(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("tsl_lookups_total", "outcome" => outcome).increment(1);
}
