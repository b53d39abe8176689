// src/metrics.rs
//! Prometheus wiring: installs the recorder, pre-registers every harvest
//! series so they appear on /metrics before the first run, and exposes
//! the exposition endpoint.

use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and register all harvest series.
    /// Call once at startup, before the scheduler spawns.
    pub fn init(interval_ms: u64) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        crate::harvest::register_metrics();
        describe_gauge!("harvest_interval_ms", "Configured harvest tick interval.");
        gauge!("harvest_interval_ms").set(interval_ms as f64);

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
