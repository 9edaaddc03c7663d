// Prometheus metrics definitions for the faction map service.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Command pipelines currently running.
    pub static ref COMMANDS_IN_FLIGHT: IntGauge =
        IntGauge::new("faction_map_commands_in_flight", "Command pipelines currently running").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Commands handled, by command and outcome (`ok` or an error kind).
    pub static ref COMMANDS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("faction_map_commands_total", "Commands handled"),
        &["command", "outcome"],
    )
    .unwrap();

    /// Upstream requests, by endpoint and outcome.
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("faction_map_upstream_requests_total", "Upstream galaxy API requests"),
        &["endpoint", "outcome"],
    )
    .unwrap();

    /// Star systems resolved with usable coordinates.
    pub static ref SYSTEMS_RESOLVED_TOTAL: IntCounter = IntCounter::new(
        "faction_map_systems_resolved_total",
        "Star systems resolved with coordinates",
    )
    .unwrap();

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("faction_map_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    /// Requests rejected by the per-requester rate limit.
    pub static ref RATE_LIMITED_TOTAL: IntCounter = IntCounter::new(
        "faction_map_rate_limited_total",
        "Commands rejected by the rate limiter",
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Upstream request duration in seconds, by endpoint.
    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "faction_map_upstream_request_duration_seconds",
            "Upstream request duration in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0]),
        &["endpoint"],
    )
    .unwrap();

    /// End-to-end pipeline duration in seconds, by command.
    pub static ref PIPELINE_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "faction_map_pipeline_duration_seconds",
            "Command pipeline duration in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["command"],
    )
    .unwrap();

    /// Map rasterisation and PNG encoding time.
    pub static ref RENDER_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("faction_map_render_duration_seconds", "Map render time in seconds")
            .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(COMMANDS_IN_FLIGHT.clone()),
            Box::new(COMMANDS_TOTAL.clone()),
            Box::new(UPSTREAM_REQUESTS_TOTAL.clone()),
            Box::new(SYSTEMS_RESOLVED_TOTAL.clone()),
            Box::new(API_REQUESTS_TOTAL.clone()),
            Box::new(RATE_LIMITED_TOTAL.clone()),
            Box::new(UPSTREAM_REQUEST_DURATION_SECONDS.clone()),
            Box::new(PIPELINE_DURATION_SECONDS.clone()),
            Box::new(RENDER_DURATION_SECONDS.clone()),
        ];

        for c in collectors {
            if let Err(e) = REGISTRY.register(c) {
                tracing::error!("Failed to register metric: {e}");
            }
        }
    });
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice_is_harmless() {
        register_metrics();
        register_metrics();
    }

    #[test]
    fn test_gather_metrics_contains_counters() {
        register_metrics();
        COMMANDS_TOTAL
            .with_label_values(&["faction_map", "ok"])
            .inc();
        let output = gather_metrics();
        assert!(output.contains("faction_map_commands_total"));
    }

    #[test]
    fn test_metric_increments() {
        // Just verify that updating metrics works without panicking
        COMMANDS_IN_FLIGHT.inc();
        COMMANDS_IN_FLIGHT.dec();

        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&["presence", "ok"])
            .inc();
        SYSTEMS_RESOLVED_TOTAL.inc_by(3);
        RATE_LIMITED_TOTAL.inc();
        API_REQUESTS_TOTAL
            .with_label_values(&["POST", "/api/commands", "200"])
            .inc();

        UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&["systems"])
            .observe(0.3);
        PIPELINE_DURATION_SECONDS
            .with_label_values(&["faction_report"])
            .observe(1.2);
        RENDER_DURATION_SECONDS.observe(0.04);
    }
}
