// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus-based metrics for pipeline throughput and stage behavior.
//! Counters and gauges only; scraping is left to whatever exposes
//! `PipelineMetrics::gather` as a text endpoint.

use std::sync::Arc;
use std::time::Duration;

use merchant_pipeline_domain::error::CoreError;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

#[derive(Clone)]
pub struct PipelineMetrics {
    registry: Arc<Registry>,

    transactions_imported_total: IntCounter,
    transactions_classified_total: IntCounter,
    duplicates_detected_total: IntCounter,
    stage_failures_total: IntCounterVec,
    stage_duration: IntCounterVec,
    pipeline_duration: Histogram,
    review_queue_depth: IntGauge,
    ml_circuit_open: IntGauge,
}

impl PipelineMetrics {
    pub fn new() -> Result<Self, CoreError> {
        let registry = Registry::new();
        let ns = "merchant_pipeline";

        let transactions_imported_total = IntCounter::with_opts(
            Opts::new("transactions_imported_total", "Total transactions imported").namespace(ns),
        )
        .map_err(registration_error("transactions_imported_total"))?;

        let transactions_classified_total = IntCounter::with_opts(
            Opts::new("transactions_classified_total", "Total transactions classified").namespace(ns),
        )
        .map_err(registration_error("transactions_classified_total"))?;

        let duplicates_detected_total = IntCounter::with_opts(
            Opts::new("duplicates_detected_total", "Total duplicate candidates detected").namespace(ns),
        )
        .map_err(registration_error("duplicates_detected_total"))?;

        let stage_failures_total = IntCounterVec::new(
            Opts::new("stage_failures_total", "Pipeline stage failures by stage").namespace(ns),
            &["stage"],
        )
        .map_err(registration_error("stage_failures_total"))?;

        let stage_duration = IntCounterVec::new(
            Opts::new("stage_duration_micros_total", "Cumulative stage time in microseconds").namespace(ns),
            &["stage"],
        )
        .map_err(registration_error("stage_duration_micros_total"))?;

        let pipeline_duration = Histogram::with_opts(
            HistogramOpts::new("pipeline_duration_seconds", "End-to-end per-transaction pipeline duration")
                .namespace(ns)
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )
        .map_err(registration_error("pipeline_duration_seconds"))?;

        let review_queue_depth = IntGauge::with_opts(
            Opts::new("review_queue_depth", "Transactions currently awaiting manual review").namespace(ns),
        )
        .map_err(registration_error("review_queue_depth"))?;

        let ml_circuit_open = IntGauge::with_opts(
            Opts::new("ml_circuit_open", "1 if the ML oracle circuit breaker is open, else 0").namespace(ns),
        )
        .map_err(registration_error("ml_circuit_open"))?;

        registry
            .register(Box::new(transactions_imported_total.clone()))
            .map_err(registration_error("transactions_imported_total"))?;
        registry
            .register(Box::new(transactions_classified_total.clone()))
            .map_err(registration_error("transactions_classified_total"))?;
        registry
            .register(Box::new(duplicates_detected_total.clone()))
            .map_err(registration_error("duplicates_detected_total"))?;
        registry
            .register(Box::new(stage_failures_total.clone()))
            .map_err(registration_error("stage_failures_total"))?;
        registry
            .register(Box::new(stage_duration.clone()))
            .map_err(registration_error("stage_duration_micros_total"))?;
        registry
            .register(Box::new(pipeline_duration.clone()))
            .map_err(registration_error("pipeline_duration_seconds"))?;
        registry
            .register(Box::new(review_queue_depth.clone()))
            .map_err(registration_error("review_queue_depth"))?;
        registry
            .register(Box::new(ml_circuit_open.clone()))
            .map_err(registration_error("ml_circuit_open"))?;

        Ok(Self {
            registry: Arc::new(registry),
            transactions_imported_total,
            transactions_classified_total,
            duplicates_detected_total,
            stage_failures_total,
            stage_duration,
            pipeline_duration,
            review_queue_depth,
            ml_circuit_open,
        })
    }

    pub fn record_imported(&self) {
        self.transactions_imported_total.inc();
    }

    pub fn record_classified(&self) {
        self.transactions_classified_total.inc();
    }

    pub fn record_duplicate_detected(&self) {
        self.duplicates_detected_total.inc();
    }

    pub fn record_stage_failure(&self, stage: u8) {
        self.stage_failures_total.with_label_values(&[&stage.to_string()]).inc();
    }

    pub fn record_stage_duration(&self, stage: u8, elapsed: Duration) {
        self.stage_duration
            .with_label_values(&[&stage.to_string()])
            .inc_by(elapsed.as_micros() as u64);
    }

    pub fn record_pipeline_duration(&self, elapsed: Duration) {
        self.pipeline_duration.observe(elapsed.as_secs_f64());
    }

    pub fn set_review_queue_depth(&self, depth: i64) {
        self.review_queue_depth.set(depth);
    }

    pub fn set_ml_circuit_open(&self, open: bool) {
        self.ml_circuit_open.set(if open { 1 } else { 0 });
    }

    /// Renders the registry in Prometheus text exposition format.
    pub fn gather(&self) -> Result<String, CoreError> {
        let encoder = prometheus::TextEncoder::new();
        let families = self.registry.gather();
        encoder
            .encode_to_string(&families)
            .map_err(|e| CoreError::ConfigurationError { message: format!("encoding metrics: {e}") })
    }
}

fn registration_error(metric: &'static str) -> impl Fn(prometheus::Error) -> CoreError {
    move |e| CoreError::ConfigurationError { message: format!("registering metric {metric}: {e}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_includes_registered_metric_names() {
        let metrics = PipelineMetrics::new().unwrap();
        metrics.record_imported();
        metrics.record_stage_failure(2);
        metrics.set_review_queue_depth(3);

        let text = metrics.gather().unwrap();
        assert!(text.contains("merchant_pipeline_transactions_imported_total"));
        assert!(text.contains("merchant_pipeline_stage_failures_total"));
        assert!(text.contains("merchant_pipeline_review_queue_depth"));
    }
}
