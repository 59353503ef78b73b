use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "aggregate_requests_total",
            "Aggregation calls handled (cached or live)."
        );
        describe_counter!("cache_hits_total", "Cache reads served from an entry.");
        describe_counter!("cache_misses_total", "Cache reads that found nothing usable.");
        describe_counter!("cache_writes_total", "Cache entries written or replaced.");
        describe_counter!(
            "cache_evictions_total",
            "Expired entries removed by the sweep."
        );
        describe_counter!("provider_errors_total", "Provider fetch failures by count.");
        describe_counter!(
            "provider_records_total",
            "Normalized records parsed from provider responses."
        );
        describe_histogram!("provider_fetch_ms", "Provider fetch time in milliseconds.");
        describe_histogram!(
            "aggregate_request_ms",
            "End-to-end aggregation time in milliseconds."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Call once from the entrypoint.
    pub fn init() -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");
        ensure_metrics_described();
        Self { handle }
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
