//! Metrics and observability utilities
//!
//! Prometheus metrics through the `metrics` facade with a shared naming
//! prefix.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Metrics prefix for all platform metrics
pub const METRICS_PREFIX: &str = "smartlegal";

/// Histogram buckets for HTTP request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, // 1ms
    0.005, // 5ms
    0.010, // 10ms
    0.025, // 25ms
    0.050, // 50ms
    0.100, // 100ms
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
];

/// Buckets for LLM latency (completions take seconds, not milliseconds)
pub const LLM_BUCKETS: &[f64] = &[
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
    20.00, // 20s
    30.00, // 30s
    60.00, // 1m
    120.0, // 2m
];

fn name(suffix: &str) -> String {
    format!("{}_{}", METRICS_PREFIX, suffix)
}

/// Install the Prometheus exporter listening on `port`
pub fn install_exporter(port: u16) -> Result<(), String> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full(name("request_duration_seconds")),
            LATENCY_BUCKETS,
        )
        .and_then(|b| {
            b.set_buckets_for_metric(Matcher::Full(name("llm_duration_seconds")), LLM_BUCKETS)
        })
        .map_err(|e| e.to_string())?
        .install()
        .map_err(|e| e.to_string())?;

    register_metrics();
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        name("requests_total"),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        name("request_duration_seconds"),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        name("llm_calls_total"),
        Unit::Count,
        "LLM calls by operation and outcome"
    );

    describe_counter!(
        name("llm_tokens_total"),
        Unit::Count,
        "Tokens reported by the LLM provider"
    );

    describe_histogram!(
        name("llm_duration_seconds"),
        Unit::Seconds,
        "LLM call latency in seconds"
    );

    describe_counter!(
        name("admission_rejections_total"),
        Unit::Count,
        "Paid calls refused for insufficient balance"
    );

    describe_counter!(
        name("clause_retrievals_total"),
        Unit::Count,
        "Knowledge base retrievals by outcome"
    );

    describe_counter!(
        name("manual_requests_total"),
        Unit::Count,
        "Manual intake submissions by mode"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            name("requests_total"),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            name("request_duration_seconds"),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record one LLM call
pub fn record_llm_call(operation: &'static str, success: bool, tokens: i32, duration_secs: f64) {
    let outcome = if success { "ok" } else { "error" };

    counter!(
        name("llm_calls_total"),
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);

    if tokens > 0 {
        counter!(name("llm_tokens_total"), "operation" => operation).increment(tokens as u64);
    }

    histogram!(name("llm_duration_seconds"), "operation" => operation).record(duration_secs);
}

pub fn record_admission_rejection(operation: &'static str) {
    counter!(name("admission_rejections_total"), "operation" => operation).increment(1);
}

pub fn record_clause_retrieval(category: &'static str, count: usize) {
    let outcome = if count == 0 { "empty" } else { "hit" };

    counter!(
        name("clause_retrievals_total"),
        "clause_type" => category,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_manual_request(mode: &'static str) {
    counter!(name("manual_requests_total"), "mode" => mode).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_are_sorted() {
        for buckets in [LATENCY_BUCKETS, LLM_BUCKETS] {
            let mut prev = 0.0;
            for &bucket in buckets {
                assert!(bucket > prev);
                prev = bucket;
            }
        }
    }

    #[test]
    fn test_recorders_run_without_exporter() {
        let metrics = RequestMetrics::start("GET", "/api/contracts");
        metrics.finish(200);
        record_llm_call("analyze", true, 120, 0.5);
        record_llm_call("generate", false, 0, 0.1);
        record_admission_rejection("analyze");
        record_clause_retrieval("NDA", 0);
        record_manual_request("degraded");
    }
}
